use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::fs::atomic_write;
use crate::paths;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

fn default_primary_language() -> String {
    "Chinese".to_string()
}

fn default_target_language() -> String {
    "English".to_string()
}

fn default_alternative_languages() -> Vec<String> {
    vec!["French".to_string(), "Japanese".to_string()]
}

fn default_small_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_large_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Configuration problems the user has to fix before anything can run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "An API key is required for {base_url}\n\n\
         Set the {env_var} environment variable:\n  \
         export {env_var}=\"your-api-key\"\n\n\
         Or pass --api-key, or set api_key in ~/.config/autotl/config.toml"
    )]
    MissingApiKey { base_url: String, env_var: String },

    #[error("{0}")]
    Invalid(String),
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    ConfigError::Invalid(message.into()).into()
}

/// The `[preferences]` section of config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// The user's native language.
    #[serde(default = "default_primary_language")]
    pub primary_language: String,
    /// Where text written in the primary language is translated to.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Other languages the user commonly reads.
    #[serde(default = "default_alternative_languages")]
    pub alternative_languages: Vec<String>,
    /// Model used for language detection.
    #[serde(default = "default_small_model")]
    pub small_model: String,
    /// Model used for translation.
    #[serde(default = "default_large_model")]
    pub large_model: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            primary_language: default_primary_language(),
            target_language: default_target_language(),
            alternative_languages: default_alternative_languages(),
            small_model: default_small_model(),
            large_model: default_large_model(),
        }
    }
}

/// The `[credentials]` section of config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Base URL of the OpenAI-compatible API, including the version segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key stored directly in config (not recommended).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    /// Set to an empty string for endpoints that need no key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl CredentialsConfig {
    /// Name of the environment variable holding the key, if one is configured.
    pub fn key_env(&self) -> Option<&str> {
        Some(self.api_key_env.as_str()).filter(|name| !name.is_empty())
    }

    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = self.key_env()
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone().filter(|key| !key.is_empty())
    }

    /// Returns `true` if this endpoint is configured to require an API key.
    pub fn requires_api_key(&self) -> bool {
        self.api_key.is_some() || self.key_env().is_some()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/autotl/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Resolved API credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Preferences read by every detect/translate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreferences {
    pub primary_language: String,
    pub target_language: String,
    pub alternative_languages: Vec<String>,
    pub credentials: Credentials,
    pub small_model: String,
    pub large_model: String,
}

impl UserPreferences {
    /// Primary, target and alternative languages in that order, without duplicates.
    pub fn preferred_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = Vec::with_capacity(2 + self.alternative_languages.len());
        let all = [&self.primary_language, &self.target_language]
            .into_iter()
            .chain(self.alternative_languages.iter());

        for lang in all {
            if !lang.is_empty() && !languages.contains(lang) {
                languages.push(lang.clone());
            }
        }
        languages
    }
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub primary: Option<String>,
    pub target: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub small_model: Option<String>,
    pub large_model: Option<String>,
}

/// Merges CLI options with config file settings and validates the result.
///
/// CLI options take precedence over config file values, which take precedence
/// over built-in defaults.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<UserPreferences> {
    let prefs = &config_file.preferences;
    let creds = &config_file.credentials;

    let pick = |cli: &Option<String>, file: &String| cli.clone().unwrap_or_else(|| file.clone());

    let api_key = options
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| creds.get_api_key());

    let base_url = pick(&options.base_url, &creds.base_url);

    if creds.requires_api_key() && api_key.is_none() {
        return Err(ConfigError::MissingApiKey {
            base_url,
            env_var: creds.key_env().unwrap_or(DEFAULT_API_KEY_ENV).to_string(),
        }
        .into());
    }

    let resolved = UserPreferences {
        primary_language: pick(&options.primary, &prefs.primary_language),
        target_language: pick(&options.target, &prefs.target_language),
        alternative_languages: prefs.alternative_languages.clone(),
        credentials: Credentials { base_url, api_key },
        small_model: pick(&options.small_model, &prefs.small_model),
        large_model: pick(&options.large_model, &prefs.large_model),
    };

    validate_preferences(&resolved)?;
    Ok(resolved)
}

/// Checks the invariants every stored preference set must satisfy.
pub fn validate_preferences(prefs: &UserPreferences) -> Result<()> {
    validate_language_field("Primary language", &prefs.primary_language)?;
    validate_language_field("Target language", &prefs.target_language)?;

    if prefs.alternative_languages.is_empty() {
        return Err(invalid("At least one alternative language is required."));
    }

    validate_base_url(&prefs.credentials.base_url)?;

    if prefs.small_model.trim().is_empty() {
        return Err(invalid("Small model is required."));
    }
    if prefs.large_model.trim().is_empty() {
        return Err(invalid("Large model is required."));
    }

    Ok(())
}

/// Language names need at least two characters.
pub fn validate_language_field(field: &str, value: &str) -> Result<()> {
    if value.trim().chars().count() < 2 {
        return Err(invalid(format!("{field} must be at least 2 characters.")));
    }
    Ok(())
}

pub fn validate_base_url(value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| invalid(format!("Please enter a valid URL: '{value}' ({e})")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "Please enter a valid URL: '{value}' must use http or https"
        )));
    }
    Ok(())
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/autotl/config.toml`
    /// or `~/.config/autotl/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    /// Creates a manager for an explicit file path.
    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })
    }

    /// Loads the config file, falling back to built-in defaults when it does not exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            Ok(ConfigFile::default())
        }
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        atomic_write(&self.config_path, &contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }
}
