//! Chat mode UI components.

use crate::config::UserPreferences;
use crate::ui::Style;

use super::session::SessionConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - Interactive Translation Mode",
        Style::header("autotl"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(config: &SessionConfig, prefs: &UserPreferences) {
    println!("{}", Style::header("Configuration"));
    println!("  {}          {}", Style::label("to"), Style::value(&config.to));
    println!("  {}        {}", Style::label("from"), Style::value(&config.from));
    println!(
        "  {}     {}",
        Style::label("primary"),
        Style::value(&prefs.primary_language)
    );
    println!(
        "  {}      {}",
        Style::label("target"),
        Style::value(&prefs.target_language)
    );
    println!(
        "  {}  {}",
        Style::label("also reads"),
        Style::value(prefs.alternative_languages.join(", "))
    );
    println!(
        "  {} {}",
        Style::label("small model"),
        Style::value(&prefs.small_model)
    );
    println!(
        "  {} {}",
        Style::label("large model"),
        Style::value(&prefs.large_model)
    );
    println!(
        "  {}    {}",
        Style::label("base url"),
        Style::secondary(&prefs.credentials.base_url)
    );
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    println!(
        "  {}  {}",
        Style::command("/to <lang|auto>"),
        Style::secondary("Set the target language")
    );
    println!(
        "  {}  {}",
        Style::command("/from <lang|auto>"),
        Style::secondary("Set the source language")
    );
    println!(
        "  {}  {}",
        Style::command("/config"),
        Style::secondary("Show current configuration")
    );
    println!(
        "  {}    {}",
        Style::command("/help"),
        Style::secondary("Show this help")
    );
    println!(
        "  {}    {}",
        Style::command("/quit"),
        Style::secondary("Exit chat mode")
    );
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
