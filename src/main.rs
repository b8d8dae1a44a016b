use anyhow::Result;
use clap::Parser;

use autotl::cli::commands::{cache, chat, configure, detect, models, translate};
use autotl::cli::{Args, Command, exit_code};
use autotl::input::InputSource;
use autotl::output::{self, OutputConfig};
use autotl::translation::print_languages;
use autotl::ui::Style;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let defaults = OutputConfig::default();
    output::init(OutputConfig {
        quiet: args.global.quiet,
        no_color: args.global.no_color || defaults.no_color,
    });
    output::init_logging(args.global.verbose);

    if let Err(err) = run(args).await {
        eprintln!("{} {err:#}", Style::error("Error:"));
        std::process::exit(exit_code(&err));
    }
}

async fn run(args: Args) -> Result<()> {
    let global = args.global;

    match args.command {
        Some(Command::Languages) => {
            print_languages();
        }
        Some(Command::Configure { show: true }) => {
            configure::show_configure()?;
        }
        Some(Command::Configure { show: false }) => {
            configure::run_configure().await?;
        }
        Some(Command::Models) => {
            models::run_models(&global).await?;
        }
        Some(Command::ClearCache) => {
            cache::run_clear_cache()?;
        }
        Some(Command::Detect {
            file,
            text,
            no_cache,
        }) => {
            detect::run_detect(InputSource::from_args(text, file), no_cache, &global).await?;
        }
        Some(Command::Chat { to, from }) => {
            chat::run_chat(to, from, &global).await?;
        }
        None => {
            let options = translate::TranslateOptions {
                input: InputSource::from_args(args.text, args.file),
                to: args.to,
                from: args.from,
                no_cache: args.no_cache,
            };
            translate::run_translate(options, &global).await?;
        }
    }

    Ok(())
}
