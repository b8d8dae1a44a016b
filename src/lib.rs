//! # autotl - Detect-and-Translate CLI
//!
//! `autotl` asks a small model which language a text is written in, decides
//! the translation direction from your language preferences, and has a large
//! model translate it. Any OpenAI-compatible endpoint works.
//!
//! ## Direction rule
//!
//! - An explicit target (`--to`) always wins.
//! - Text in your primary language is translated to your target language.
//! - Anything else is translated into your primary language.
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate inline text
//! autotl -x "Bonjour tout le monde"
//!
//! # Translate from stdin
//! cat notes.md | autotl
//!
//! # Force a target language
//! autotl --to Japanese ./notes.md
//!
//! # Only detect
//! autotl detect -x "Hallo"
//!
//! # Interactive chat mode
//! autotl chat
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/autotl/config.toml`:
//!
//! ```toml
//! [preferences]
//! primary_language = "Chinese"
//! target_language = "English"
//! alternative_languages = ["French", "Japanese"]
//! small_model = "gpt-3.5-turbo"
//! large_model = "gpt-4o"
//!
//! [credentials]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! ```

/// Completion caches: in-flight de-duplication and `SQLite` persistence.
pub mod cache;

/// Interactive chat mode for translation sessions.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Preferences file management, merging and validation.
pub mod config;

/// File system utilities.
pub mod fs;

/// Input reading from files, inline text and stdin.
pub mod input;

/// Global output configuration and diagnostic logging.
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Language detection, direction rule and translation.
pub mod translation;

/// Terminal UI components (spinner, colors).
pub mod ui;
