use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use crate::translation::{
    CompletionBackend, Engine, Lang, Outcome, TranslateError, UNKNOWN_LANGUAGE,
    is_supported_language,
};
use crate::ui::{Spinner, Style};

/// Per-session language overrides, changed with `/to` and `/from`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub to: Lang,
    pub from: Lang,
}

/// What to show after one line was handled.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Translated {
        source: String,
        target: String,
        text: String,
    },
    Failed {
        label: String,
        message: String,
    },
    Dropped,
}

/// An interactive chat session for translation.
///
/// Failed lines are reported and the session keeps going.
pub struct ChatSession<B> {
    engine: Engine<B>,
    config: SessionConfig,
}

impl<B: CompletionBackend> ChatSession<B> {
    pub const fn new(engine: Engine<B>, config: SessionConfig) -> Self {
        Self { engine, config }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header();

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        loop {
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_help_message("Type text to translate, /help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Input::Text(text) => {
                        let spinner = Spinner::new("Translating...");
                        let reply = self.translate_line(&text).await;
                        spinner.stop();
                        print_reply(&reply);
                    }
                },
                Err(
                    inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted,
                ) => {
                    println!();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Config => {
                ui::print_config(&self.config, self.engine.preferences());
                true
            }
            SlashCommand::Help => {
                ui::print_help();
                true
            }
            SlashCommand::Quit => false,
            SlashCommand::To(value) => {
                if let Some(lang) = parse_language(value.as_deref(), "/to") {
                    print_language_set("Target", &lang);
                    self.config.to = lang;
                }
                true
            }
            SlashCommand::From(value) => {
                if let Some(lang) = parse_language(value.as_deref(), "/from") {
                    print_language_set("Source", &lang);
                    self.config.from = lang;
                }
                true
            }
            SlashCommand::Unknown(cmd) => {
                ui::print_error(&format!("Unknown command: /{cmd}"));
                true
            }
        }
    }

    async fn translate_line(&self, text: &str) -> Reply {
        match self
            .engine
            .run(text, &self.config.from, &self.config.to)
            .await
        {
            Ok(Outcome::Translated(translation)) => Reply::Translated {
                source: translation.plan.source,
                target: translation.plan.target,
                text: translation.text,
            },
            Ok(Outcome::Superseded) => Reply::Dropped,
            Err(e) => {
                let label = match (&e, &self.config.from) {
                    (TranslateError::Detection(_), _) => UNKNOWN_LANGUAGE.to_string(),
                    (_, Lang::Named(source)) => source.clone(),
                    // Detection succeeded, so its reply is memoized.
                    (_, Lang::Auto) => self
                        .engine
                        .detect(text)
                        .await
                        .unwrap_or_else(|_| UNKNOWN_LANGUAGE.to_string()),
                };
                Reply::Failed {
                    label,
                    message: format!("{:#}", anyhow::Error::from(e)),
                }
            }
        }
    }
}

fn parse_language(value: Option<&str>, command: &str) -> Option<Lang> {
    let Some(value) = value else {
        ui::print_error(&format!("Usage: {command} <language|auto>"));
        return None;
    };
    value.parse().ok()
}

fn print_language_set(which: &str, lang: &Lang) {
    println!(
        "{} {which} language set to {}",
        Style::success("✓"),
        Style::value(lang)
    );
    if let Lang::Named(name) = lang
        && !is_supported_language(name)
    {
        println!(
            "  {}",
            Style::hint(format!("'{name}' is not in the suggested list; it is sent as written"))
        );
    }
    println!();
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Translated {
            source,
            target,
            text,
        } => {
            println!(
                "{} {} {}",
                Style::badge(source),
                Style::secondary("→"),
                Style::value(target)
            );
            println!("{}", text.trim_end());
            println!();
        }
        Reply::Failed { label, message } => {
            println!("{}", Style::badge(label));
            ui::print_error(message);
        }
        Reply::Dropped => {}
    }
}
