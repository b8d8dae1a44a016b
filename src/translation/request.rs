use sha2::{Digest, Sha256};

use super::error::Stage;
use super::prompt::{
    DETECT_PROMPT_TEMPLATE, TRANSLATE_PROMPT_TEMPLATE, build_detect_prompt,
    build_translate_prompt,
};
use crate::config::UserPreferences;

/// One model call, fully described. Two requests with equal fields are
/// interchangeable, which is what caching and de-duplication rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub stage: Stage,
    pub model: String,
    pub base_url: String,
    pub prompt: String,
}

impl CompletionRequest {
    /// Detection request against the small model.
    pub fn detect(text: &str, prefs: &UserPreferences) -> Self {
        Self {
            stage: Stage::Detection,
            model: prefs.small_model.clone(),
            base_url: prefs.credentials.base_url.clone(),
            prompt: build_detect_prompt(text, &prefs.preferred_languages()),
        }
    }

    /// Translation request against the large model.
    pub fn translate(text: &str, source: &str, target: &str, prefs: &UserPreferences) -> Self {
        Self {
            stage: Stage::Translation,
            model: prefs.large_model.clone(),
            base_url: prefs.credentials.base_url.clone(),
            prompt: build_translate_prompt(text, source, target),
        }
    }

    /// Compute cache key for this request.
    ///
    /// The prompt already embeds the text, the languages involved and the
    /// preference-derived language list.
    pub fn cache_key(&self) -> String {
        let cache_input = serde_json::json!({
            "stage": self.stage.as_str(),
            "prompt": self.prompt,
            "model": self.model,
            "base_url": self.base_url,
            "prompt_hash": Self::prompt_hash(self.stage),
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Hash of the prompt template used for `stage`.
    pub fn prompt_hash(stage: Stage) -> String {
        let template = match stage {
            Stage::Detection => DETECT_PROMPT_TEMPLATE,
            Stage::Translation => TRANSLATE_PROMPT_TEMPLATE,
        };
        let mut hasher = Sha256::new();
        hasher.update(template.as_bytes());
        hex::encode(hasher.finalize())
    }
}
