//! Subcommand implementations.

use anyhow::Result;

use crate::cache::CacheManager;
use crate::config::{ConfigManager, UserPreferences, resolve_config};
use crate::translation::{Engine, ModelClient};

use super::GlobalArgs;

/// Cache maintenance command handler.
pub mod cache;

/// Chat mode command handler.
pub mod chat;

/// Configure command handler.
pub mod configure;

/// Language detection command handler.
pub mod detect;

/// Model listing command handler.
pub mod models;

/// Translation command handler.
pub mod translate;

/// Loads config.toml and applies the command-line overrides.
pub fn load_preferences(global: &GlobalArgs) -> Result<UserPreferences> {
    let manager = ConfigManager::new()?;
    let config_file = manager.load_or_default()?;
    resolve_config(&global.resolve_options(), &config_file)
}

/// Builds an engine for the resolved preferences, with the on-disk cache
/// unless `no_cache` is set.
pub fn build_engine(global: &GlobalArgs, no_cache: bool) -> Result<Engine<ModelClient>> {
    let prefs = load_preferences(global)?;
    let client = ModelClient::from_credentials(&prefs.credentials);
    let engine = Engine::new(client, prefs);

    if no_cache {
        return Ok(engine);
    }

    match CacheManager::new() {
        Ok(store) => Ok(engine.with_store(store)),
        Err(e) => {
            tracing::warn!(error = %e, "persistent cache unavailable");
            Ok(engine)
        }
    }
}
