use clap::{ArgAction, Parser, Subcommand};

use crate::config::ResolveOptions;
use crate::translation::Lang;

#[derive(Parser, Debug)]
#[command(name = "autotl")]
#[command(about = "Detect the language of a text and translate it with an LLM")]
#[command(version)]
pub struct Args {
    /// File to translate (reads from stdin if neither FILE nor --text is given)
    pub file: Option<String>,

    /// Text to translate
    #[arg(short = 'x', long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Target language, or "auto" to decide from your preferences
    #[arg(short = 't', long = "to", default_value = "auto")]
    pub to: Lang,

    /// Source language, or "auto" to detect it
    #[arg(short = 'f', long = "from", default_value = "auto")]
    pub from: Lang,

    /// Disable cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options accepted by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Base URL of the OpenAI-compatible API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API key (overrides the config file and environment)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model used for language detection
    #[arg(long, global = true)]
    pub small_model: Option<String>,

    /// Model used for translation
    #[arg(long, global = true)]
    pub large_model: Option<String>,

    /// Primary language (the one you read)
    #[arg(long, global = true)]
    pub primary: Option<String>,

    /// Language your primary-language text is translated into
    #[arg(long, global = true)]
    pub target: Option<String>,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase diagnostic logging (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            primary: self.primary.clone(),
            target: self.target.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            small_model: self.small_model.clone(),
            large_model: self.large_model.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the detected language of the input
    Detect {
        /// File to inspect (reads from stdin if neither FILE nor --text is given)
        file: Option<String>,

        /// Text to inspect
        #[arg(short = 'x', long, conflicts_with = "file")]
        text: Option<String>,

        /// Disable cache
        #[arg(short = 'n', long)]
        no_cache: bool,
    },
    /// Interactive translation session
    Chat {
        /// Target language, or "auto" to decide from your preferences
        #[arg(short = 't', long = "to", default_value = "auto")]
        to: Lang,

        /// Source language, or "auto" to detect it
        #[arg(short = 'f', long = "from", default_value = "auto")]
        from: Lang,
    },
    /// Edit your language and model preferences
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// List suggested language names
    Languages,
    /// List the models offered by the API
    Models,
    /// Delete every cached reply
    ClearCache,
}
