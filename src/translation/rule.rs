//! Picks the translation direction from the detected language and preferences.

use std::fmt;

use super::language::Lang;
use crate::config::UserPreferences;

/// Why a target language was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanReason {
    /// The caller asked for a specific target.
    Explicit,
    /// The text is in the primary language; translate out to the target language.
    Outward,
    /// The text is foreign; translate in to the primary language.
    Inward,
}

impl fmt::Display for PlanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Explicit => "explicit",
            Self::Outward => "outward",
            Self::Inward => "inward",
        })
    }
}

/// Source and target languages for one translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPlan {
    pub source: String,
    pub target: String,
    pub reason: PlanReason,
}

/// Decides the effective target language.
///
/// The comparison against the primary language is exact and case-sensitive;
/// the detected string is used as given.
pub fn plan_translation(detected: &str, target: &Lang, prefs: &UserPreferences) -> TranslationPlan {
    let (target, reason) = match target {
        Lang::Named(explicit) => (explicit.clone(), PlanReason::Explicit),
        Lang::Auto if detected == prefs.primary_language => {
            (prefs.target_language.clone(), PlanReason::Outward)
        }
        Lang::Auto => (prefs.primary_language.clone(), PlanReason::Inward),
    };

    TranslationPlan {
        source: detected.to_string(),
        target,
        reason,
    }
}
