use std::fmt;

use reqwest::StatusCode;

/// Which model call produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detection,
    Translation,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detection => "detection",
            Self::Translation => "translation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by detect/translate calls.
///
/// Every error is scoped to a single request; retrying the action is always safe.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Failed to connect to API endpoint: {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Failed to decode API response")]
    Decode(#[source] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Model returned no content for {0}")]
    EmptyResponse(Stage),

    #[error("Language detection failed")]
    Detection(#[source] Box<TranslateError>),
}

impl TranslateError {
    /// Returns `true` if the failure came from the remote side rather than the input.
    pub fn is_remote(&self) -> bool {
        match self {
            Self::EmptyInput => false,
            Self::Detection(inner) => inner.is_remote(),
            _ => true,
        }
    }
}
