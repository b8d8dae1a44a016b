mod client;
mod engine;
mod error;
mod generation;
mod language;
mod prompt;
mod request;
mod rule;
mod sse_parser;

pub use client::{CompletionBackend, ModelClient, TextStream};
pub use engine::{Engine, Outcome, Translation};
pub use error::{Stage, TranslateError};
pub use generation::{Generation, RequestGeneration};
pub use language::{
    Lang, SUPPORTED_LANGUAGES, UNKNOWN_LANGUAGE, is_supported_language, print_languages,
};
pub use prompt::{build_detect_prompt, build_translate_prompt};
pub use request::CompletionRequest;
pub use rule::{PlanReason, TranslationPlan, plan_translation};

#[cfg(test)]
pub(crate) use request::fixtures;
