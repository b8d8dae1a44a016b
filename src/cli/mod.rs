//! Command-line interface definitions and handlers.

/// CLI argument parsing with clap.
pub mod args;

/// Subcommand implementations.
pub mod commands;

pub use args::{Args, Command, GlobalArgs};

use crate::config::ConfigError;
use crate::translation::TranslateError;

/// Maps a command failure to a process exit code.
pub fn exit_code(err: &anyhow::Error) -> exitcode::ExitCode {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<TranslateError>() {
            return match e {
                TranslateError::EmptyInput => exitcode::DATAERR,
                e if e.is_remote() => exitcode::UNAVAILABLE,
                _ => exitcode::SOFTWARE,
            };
        }
        if cause.is::<ConfigError>() || cause.is::<toml::de::Error>() {
            return exitcode::CONFIG;
        }
        if cause.is::<std::io::Error>() {
            return exitcode::IOERR;
        }
    }
    exitcode::SOFTWARE
}
