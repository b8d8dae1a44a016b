use anyhow::Result;

use super::build_engine;
use crate::cli::GlobalArgs;
use crate::input::{InputReader, InputSource};
use crate::status;
use crate::translation::{UNKNOWN_LANGUAGE, is_supported_language};
use crate::ui::{Spinner, Style};

/// Prints the detected language of the input on stdout.
pub async fn run_detect(input: InputSource, no_cache: bool, global: &GlobalArgs) -> Result<()> {
    let text = InputReader::read(&input)?;
    let engine = build_engine(global, no_cache)?;

    let spinner = Spinner::new("Detecting language...");
    let detected = engine.detect(&text).await;
    spinner.stop();

    let detected = match detected {
        Ok(detected) => detected,
        Err(e) => {
            status!("{}", Style::badge(UNKNOWN_LANGUAGE));
            return Err(e.into());
        }
    };

    println!("{detected}");
    if !is_supported_language(&detected) {
        tracing::info!(%detected, "detected language is outside the suggested list");
    }
    Ok(())
}
