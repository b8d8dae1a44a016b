use anyhow::Result;
use std::io::{self, Write};

use super::build_engine;
use crate::cli::GlobalArgs;
use crate::input::{InputReader, InputSource};
use crate::status;
use crate::translation::{Lang, TranslateError, TranslationPlan, UNKNOWN_LANGUAGE};
use crate::ui::{Spinner, Style};

pub struct TranslateOptions {
    pub input: InputSource,
    pub to: Lang,
    pub from: Lang,
    pub no_cache: bool,
}

pub async fn run_translate(options: TranslateOptions, global: &GlobalArgs) -> Result<()> {
    let source_text = InputReader::read(&options.input)?;
    let engine = build_engine(global, options.no_cache)?;

    let spinner = Spinner::new(if options.from.is_auto() {
        "Detecting language..."
    } else {
        "Translating..."
    });

    let plan = match engine.plan(&source_text, &options.from, &options.to).await {
        Ok(plan) => plan,
        Err(e) => {
            spinner.stop();
            if matches!(e, TranslateError::Detection(_)) {
                status!("{}", Style::badge(UNKNOWN_LANGUAGE));
            }
            return Err(e.into());
        }
    };

    spinner.set_message("Translating...");

    let mut first_chunk = true;
    let result = engine
        .translate_streaming(&source_text, &plan, |chunk| {
            if first_chunk {
                spinner.stop();
                print_direction(&plan);
                first_chunk = false;
            }
            print!("{chunk}");
            let _ = io::stdout().flush();
        })
        .await;

    spinner.stop();
    if first_chunk {
        print_direction(&plan);
    }

    let translated = result?;
    if !translated.ends_with('\n') {
        println!();
    }
    io::stdout().flush()?;

    Ok(())
}

fn print_direction(plan: &TranslationPlan) {
    status!(
        "{} {} {}",
        Style::badge(&plan.source),
        Style::secondary("→"),
        Style::value(&plan.target)
    );
}
