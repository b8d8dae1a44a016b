use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, IsTerminal, Read};

use crate::translation::TranslateError;

const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB

/// Where the text to detect or translate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Text given directly on the command line.
    Inline(String),
    /// A file path.
    File(String),
    /// Standard input.
    Stdin,
}

impl InputSource {
    /// Picks the source from CLI arguments: inline text wins over a file,
    /// and stdin is used when neither is given.
    pub fn from_args(text: Option<String>, file: Option<String>) -> Self {
        match (text, file) {
            (Some(text), _) => Self::Inline(text),
            (None, Some(file)) => Self::File(file),
            (None, None) => Self::Stdin,
        }
    }
}

pub struct InputReader;

impl InputReader {
    /// Reads the whole input, rejecting oversize and whitespace-only text.
    pub fn read(source: &InputSource) -> Result<String> {
        let text = match source {
            InputSource::Inline(text) => {
                check_size(text.len(), "text")?;
                text.clone()
            }
            InputSource::File(path) => Self::read_file(path)?,
            InputSource::Stdin => Self::read_stdin()?,
        };

        if text.trim().is_empty() {
            return Err(TranslateError::EmptyInput.into());
        }
        Ok(text)
    }

    fn read_file(path: &str) -> Result<String> {
        let metadata =
            fs::metadata(path).with_context(|| format!("Failed to access file: {path}"))?;
        check_size(metadata.len() as usize, "file")?;

        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
    }

    fn read_stdin() -> Result<String> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            bail!(
                "No input provided\n\n\
                 Pass a file, use --text, or pipe text on stdin:\n  \
                 echo 'Bonjour' | autotl"
            );
        }

        let mut buffer = Vec::new();
        // Read one byte past the limit so oversize input is detectable.
        stdin
            .lock()
            .take(MAX_INPUT_SIZE as u64 + 1)
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        check_size(buffer.len(), "input")?;

        String::from_utf8(buffer).context("Input is not valid UTF-8")
    }
}

fn check_size(size: usize, what: &str) -> Result<()> {
    if size > MAX_INPUT_SIZE {
        bail!(
            "Input {what} is too large: exceeds maximum allowed size (1 MB).\n\n\
             Consider splitting it into smaller parts."
        );
    }
    Ok(())
}
