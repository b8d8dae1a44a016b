use inquire::autocompletion::{Autocomplete, Replacement};

use crate::translation::SUPPORTED_LANGUAGES;

// Available slash commands: (command, description)
const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/to", "Set the target language (or auto)"),
    ("/from", "Set the source language (or auto)"),
    ("/config", "Show current configuration"),
    ("/help", "Show available commands"),
    ("/quit", "Exit chat mode"),
];

/// Slash command autocompleter
///
/// Completes command names, then language names after `/to ` and `/from `.
#[derive(Clone, Default)]
pub struct SlashCommandCompleter;

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        if let Some((cmd, partial)) = input.split_once(' ') {
            if !matches!(cmd, "/to" | "/from") {
                return Ok(vec![]);
            }
            let partial = partial.trim_start().to_lowercase();
            let suggestions = std::iter::once("auto")
                .chain(SUPPORTED_LANGUAGES.iter().copied())
                .filter(|lang| lang.to_lowercase().starts_with(&partial))
                .map(|lang| format!("{cmd} {lang}"))
                .collect();
            return Ok(suggestions);
        }

        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        // Command suggestions carry a description after two spaces.
        let replacement = highlighted_suggestion.map(|s| match s.split_once("  ") {
            Some((cmd, _)) => cmd.to_string(),
            None => s,
        });
        Ok(replacement)
    }
}

/// Slash command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    To(Option<String>),
    From(Option<String>),
    Config,
    Help,
    Quit,
    Unknown(String),
}

/// Input types
#[derive(Debug)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let (name, rest) = cmd
        .split_once(char::is_whitespace)
        .map_or((cmd, ""), |(name, rest)| (name, rest.trim()));
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match name {
        "to" => SlashCommand::To(argument),
        "from" => SlashCommand::From(argument),
        "config" => SlashCommand::Config,
        "help" => SlashCommand::Help,
        "quit" | "exit" | "q" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(cmd.split_whitespace().collect::<Vec<_>>().join(" ")),
    };
    Input::Command(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(parse_input(""), Input::Empty));
        assert!(matches!(parse_input("   "), Input::Empty));
    }

    #[test]
    fn test_parse_text_input() {
        match parse_input("Bonjour le monde") {
            Input::Text(text) => assert_eq!(text, "Bonjour le monde"),
            _ => panic!("Expected Input::Text"),
        }
    }

    #[test]
    fn test_parse_language_commands() {
        assert!(matches!(
            parse_input("/to Japanese"),
            Input::Command(SlashCommand::To(Some(lang))) if lang == "Japanese"
        ));
        assert!(matches!(
            parse_input("/from   Simplified Chinese "),
            Input::Command(SlashCommand::From(Some(lang))) if lang == "Simplified Chinese"
        ));
        assert!(matches!(
            parse_input("/to"),
            Input::Command(SlashCommand::To(None))
        ));
    }

    #[test]
    fn test_parse_config_and_help() {
        assert!(matches!(
            parse_input("/config"),
            Input::Command(SlashCommand::Config)
        ));
        assert!(matches!(
            parse_input("/help"),
            Input::Command(SlashCommand::Help)
        ));
    }

    #[test]
    fn test_parse_quit_commands() {
        for input in ["/quit", "/exit", "/q"] {
            assert!(matches!(
                parse_input(input),
                Input::Command(SlashCommand::Quit)
            ));
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        match parse_input("/set  style casual") {
            Input::Command(SlashCommand::Unknown(cmd)) => assert_eq!(cmd, "set style casual"),
            _ => panic!("Expected Input::Command(SlashCommand::Unknown)"),
        }
    }

    #[test]
    fn test_completer_no_suggestions_for_regular_text() {
        let mut completer = SlashCommandCompleter;
        assert!(completer.get_suggestions("hello").unwrap().is_empty());
    }

    #[test]
    fn test_completer_suggestions_for_slash() {
        let mut completer = SlashCommandCompleter;
        let suggestions = completer.get_suggestions("/").unwrap();
        assert_eq!(suggestions.len(), SLASH_COMMANDS.len());
    }

    #[test]
    fn test_completer_suggestions_filter_by_prefix() {
        let mut completer = SlashCommandCompleter;

        let suggestions = completer.get_suggestions("/c").unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].starts_with("/config"));

        let suggestions = completer.get_suggestions("/f").unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].starts_with("/from"));
    }

    #[test]
    fn test_completer_suggests_languages() {
        let mut completer = SlashCommandCompleter;
        let suggestions = completer.get_suggestions("/to ja").unwrap();
        assert_eq!(suggestions, vec!["/to Japanese".to_string()]);

        let suggestions = completer.get_suggestions("/from a").unwrap();
        assert!(suggestions.contains(&"/from auto".to_string()));

        assert!(completer.get_suggestions("/help me").unwrap().is_empty());
    }

    #[test]
    fn test_completer_completion() {
        let mut completer = SlashCommandCompleter;
        let suggestion = "/config  Show current configuration".to_string();
        let completion = completer.get_completion("/c", Some(suggestion)).unwrap();
        assert_eq!(completion, Some("/config".to_string()));

        let completion = completer
            .get_completion("/to Simp", Some("/to Simplified Chinese".to_string()))
            .unwrap();
        assert_eq!(completion, Some("/to Simplified Chinese".to_string()));
    }

    #[test]
    fn test_completer_completion_none() {
        let mut completer = SlashCommandCompleter;
        assert!(completer.get_completion("/x", None).unwrap().is_none());
    }
}
