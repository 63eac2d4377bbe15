//! Radicli - command line interfaces from typed signatures
//!
//! Commands declare their parameters with types and defaults. Radicli turns
//! them into clap parsers, converts every token to a typed value and calls
//! the command with the result. A CLI can also be exported to a static file
//! that answers help and validation without the live program.

// Public modules
pub mod cli;
pub mod command;
pub mod document;
pub mod error;
pub mod export;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use cli::{Cli, Outcome, Parsed, Settings};
pub use command::{Arg, CommandDef, Param};
pub use document::DocOptions;
pub use error::{CliError, Result};
pub use export::{StaticCli, StaticData};
pub use types::{Origin, TypeTag, Value, Values};

/// Current version of Radicli
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
