//! Configure command handler for editing preferences.

use anyhow::{Result, bail};
use inquire::validator::Validation;
use inquire::{MultiSelect, Password, Select, Text};

use crate::config::{
    ConfigFile, ConfigManager, CredentialsConfig, PreferencesConfig, ResolveOptions,
    resolve_config, validate_base_url, validate_language_field,
};
use crate::status;
use crate::translation::{ModelClient, SUPPORTED_LANGUAGES};
use crate::ui::{Spinner, Style, handle_prompt_cancellation};

/// Prints the stored configuration.
pub fn show_configure() -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    println!(
        "{} {}",
        Style::header("Configuration"),
        Style::secondary(manager.config_path().display())
    );
    print_current(&config);
    Ok(())
}

/// Runs the interactive preferences editor.
///
/// Nothing is written unless the edited settings pass validation.
pub async fn run_configure() -> Result<()> {
    handle_prompt_cancellation(run_configure_inner().await)
}

async fn run_configure_inner() -> Result<()> {
    let manager = ConfigManager::new()?;
    let current = manager.load_or_default()?;

    print_current(&current);

    let primary_language = select_language(
        "Primary language (the one you read):",
        &current.preferences.primary_language,
    )?;
    let target_language = select_language(
        "Translate your primary language into:",
        &current.preferences.target_language,
    )?;
    let alternative_languages = select_alternatives(
        &current.preferences.alternative_languages,
        &[&primary_language, &target_language],
    )?;

    let credentials = edit_credentials(&current.credentials)?;

    let models = fetch_models(&credentials).await;
    let small_model = select_model(
        "Model for language detection (small):",
        &models,
        &current.preferences.small_model,
    )?;
    let large_model = select_model(
        "Model for translation (large):",
        &models,
        &current.preferences.large_model,
    )?;

    let config = ConfigFile {
        preferences: PreferencesConfig {
            primary_language,
            target_language,
            alternative_languages,
            small_model,
            large_model,
        },
        credentials,
    };

    resolve_config(&ResolveOptions::default(), &config)?;
    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display())
    );

    Ok(())
}

fn print_current(config: &ConfigFile) {
    let prefs = &config.preferences;
    let creds = &config.credentials;

    println!("{}", Style::header("Current settings"));
    println!(
        "  {}      {}",
        Style::label("primary"),
        Style::value(&prefs.primary_language)
    );
    println!(
        "  {}       {}",
        Style::label("target"),
        Style::value(&prefs.target_language)
    );
    println!(
        "  {}   {}",
        Style::label("also reads"),
        if prefs.alternative_languages.is_empty() {
            Style::secondary("(not set)")
        } else {
            Style::value(prefs.alternative_languages.join(", "))
        }
    );
    println!(
        "  {}  {}",
        Style::label("small model"),
        Style::value(&prefs.small_model)
    );
    println!(
        "  {}  {}",
        Style::label("large model"),
        Style::value(&prefs.large_model)
    );
    println!(
        "  {}     {}",
        Style::label("base url"),
        Style::secondary(&creds.base_url)
    );

    println!("  {}      {}", Style::label("api key"), key_status(creds));
    println!();
}

fn key_status(creds: &CredentialsConfig) -> String {
    match (creds.api_key.is_some(), creds.key_env()) {
        (_, Some(env)) if std::env::var(env).is_ok_and(|v| !v.is_empty()) => {
            Style::success(format!("from ${env}"))
        }
        (true, _) => Style::success("stored in config"),
        (false, Some(env)) => Style::warning(format!("not set (${env} is empty)")),
        (false, None) => Style::secondary("(not required)"),
    }
}

const OTHER_LANGUAGE: &str = "Other (type a name)";

fn select_language(message: &str, current: &str) -> Result<String> {
    let (options, cursor) = language_options(current);
    let selection = Select::new(message, options)
        .with_starting_cursor(cursor)
        .prompt()?;

    if selection != OTHER_LANGUAGE {
        return Ok(selection);
    }

    let field = message.trim_end_matches(':').to_string();
    let typed = Text::new(message)
        .with_help_message("Any language name the model understands")
        .with_validator(move |value: &str| Ok(check_language_name(&field, value)))
        .prompt()?;
    Ok(typed.trim().to_string())
}

fn check_language_name(field: &str, value: &str) -> Validation {
    match validate_language_field(field, value.trim()) {
        Ok(()) => Validation::Valid,
        Err(e) => Validation::Invalid(e.to_string().into()),
    }
}

/// Suggested languages plus a free-text entry, with `current` prepended
/// when it is a custom name.
fn language_options(current: &str) -> (Vec<String>, usize) {
    let mut options: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(ToString::to_string)
        .chain(std::iter::once(OTHER_LANGUAGE.to_string()))
        .collect();
    let cursor = match options.iter().position(|lang| lang == current) {
        Some(index) => index,
        None if current.is_empty() => 0,
        None => {
            options.insert(0, current.to_string());
            0
        }
    };
    (options, cursor)
}

fn select_alternatives(current: &[String], exclude: &[&String]) -> Result<Vec<String>> {
    let mut options: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(ToString::to_string)
        .filter(|lang| !exclude.contains(&lang))
        .collect();
    for lang in current {
        if !options.contains(lang) && !exclude.contains(&lang) {
            options.push(lang.clone());
        }
    }

    let defaults: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, lang)| current.contains(lang))
        .map(|(i, _)| i)
        .collect();

    let selection = MultiSelect::new("Other languages you read:", options)
        .with_default(&defaults)
        .with_validator(|selected: &[inquire::list_option::ListOption<&String>]| {
            if selected.is_empty() {
                Ok(Validation::Invalid(
                    "Select at least one language.".into(),
                ))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()?;

    Ok(selection)
}

fn edit_credentials(current: &CredentialsConfig) -> Result<CredentialsConfig> {
    let base_url = Text::new("API base URL:")
        .with_default(&current.base_url)
        .with_validator(|value: &str| {
            Ok(match validate_base_url(value.trim()) {
                Ok(()) => Validation::Valid,
                Err(e) => Validation::Invalid(e.to_string().into()),
            })
        })
        .prompt()?
        .trim()
        .to_string();

    let api_key_env = Text::new("Environment variable holding the API key:")
        .with_default(&current.api_key_env)
        .with_help_message("Leave empty if the endpoint needs no key")
        .prompt()?
        .trim()
        .to_string();

    let entered = Password::new("API key to store in config:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current value")
        .prompt()?;
    let api_key = if entered.trim().is_empty() {
        current.api_key.clone()
    } else {
        Some(entered.trim().to_string())
    };

    Ok(CredentialsConfig {
        base_url,
        api_key,
        api_key_env,
    })
}

async fn fetch_models(credentials: &CredentialsConfig) -> Vec<String> {
    let client = ModelClient::new(credentials.base_url.clone(), credentials.get_api_key());

    let spinner = Spinner::new("Fetching models...");
    let result = client.list_models().await;
    spinner.stop();

    match result {
        Ok(models) => models,
        Err(e) => {
            status!(
                "{} Could not list models ({e}); enter model names manually",
                Style::warning("!")
            );
            Vec::new()
        }
    }
}

fn select_model(message: &str, available_models: &[String], current: &str) -> Result<String> {
    if available_models.is_empty() {
        let model = Text::new(message)
            .with_default(current)
            .with_help_message("Enter the model name")
            .prompt()?;

        if model.trim().is_empty() {
            bail!("Model name cannot be empty");
        }

        return Ok(model.trim().to_string());
    }

    let mut options = available_models.to_vec();
    let cursor = match options.iter().position(|m| m == current) {
        Some(index) => index,
        None if current.is_empty() => 0,
        None => {
            options.insert(0, current.to_string());
            0
        }
    };

    Ok(Select::new(message, options)
        .with_starting_cursor(cursor)
        .prompt()?)
}
