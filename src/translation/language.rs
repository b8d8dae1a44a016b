//! Language names, the `auto` sentinel, and the suggested language list.

use std::fmt;
use std::str::FromStr;

use crate::ui::Style;

/// Languages offered for selection. Free-text names outside this list are
/// still accepted everywhere.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "Chinese",
    "English",
    "French",
    "German",
    "Italian",
    "Japanese",
    "Korean",
    "Portuguese",
    "Russian",
    "Spanish",
    "Vietnamese",
];

/// Label shown when detection failed or the model could not tell.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// A language selection that may defer to the preference rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Lang {
    /// No explicit choice; the orchestration rule decides.
    #[default]
    Auto,
    /// A concrete language name, used verbatim.
    Named(String),
}

impl Lang {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl FromStr for Lang {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            Ok(Self::Named(s.to_string()))
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Returns `true` if `name` is one of the suggested languages (exact match).
pub fn is_supported_language(name: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&name)
}

/// Prints the suggested languages to stdout.
pub fn print_languages() {
    println!("{}", Style::header("Supported languages"));
    for name in SUPPORTED_LANGUAGES {
        println!("  {}", Style::value(name));
    }
    println!();
    println!(
        "{}",
        Style::hint("Any other language name is passed to the model as written.")
    );
}
