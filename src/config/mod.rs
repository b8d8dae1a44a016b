//! Preferences store: config file loading, saving, merging and validation.

mod manager;

pub use manager::{
    ConfigError, ConfigFile, ConfigManager, Credentials, CredentialsConfig, DEFAULT_API_KEY_ENV,
    DEFAULT_BASE_URL, PreferencesConfig, ResolveOptions, UserPreferences, resolve_config,
    validate_base_url, validate_language_field, validate_preferences,
};
