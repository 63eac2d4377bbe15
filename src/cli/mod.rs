//! CLI interface and argument parsing
//!
//! This module holds the application object, the translation of commands
//! into clap parsers, error handlers and shell completion.

pub mod app;
pub mod completion;
pub mod errors;
pub mod parse;
pub mod settings;

// Re-export main types
pub use app::{report_error, Cli, Outcome};
pub use errors::ErrorHandlers;
pub use parse::Parsed;
pub use settings::{Settings, DEFAULT_EXTRA_KEY};
