use anyhow::Result;

use super::load_preferences;
use crate::cli::GlobalArgs;
use crate::translation::ModelClient;
use crate::ui::{Spinner, Style};

/// Lists the models the configured endpoint offers, marking the ones in use.
pub async fn run_models(global: &GlobalArgs) -> Result<()> {
    let prefs = load_preferences(global)?;
    let client = ModelClient::from_credentials(&prefs.credentials);

    let spinner = Spinner::new("Fetching models...");
    let models = client.list_models().await;
    spinner.stop();
    let models = models?;

    println!(
        "{} {}",
        Style::header("Models"),
        Style::secondary(client.base_url())
    );

    if models.is_empty() {
        println!("  {}", Style::secondary("(none reported)"));
        return Ok(());
    }

    for model in &models {
        let mut roles = Vec::new();
        if *model == prefs.small_model {
            roles.push("detection");
        }
        if *model == prefs.large_model {
            roles.push("translation");
        }

        if roles.is_empty() {
            println!("  {}", Style::value(model));
        } else {
            println!(
                "  {} {}",
                Style::value(model),
                Style::success(format!("({})", roles.join(", ")))
            );
        }
    }

    for (role, model) in [
        ("detection", &prefs.small_model),
        ("translation", &prefs.large_model),
    ] {
        if !models.contains(model) {
            println!(
                "{} {role} model {} is not offered by this endpoint",
                Style::warning("!"),
                Style::value(model)
            );
        }
    }

    Ok(())
}
