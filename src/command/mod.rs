//! Commands and their arguments
//!
//! This module turns declared command signatures into argument specs and
//! keeps the registry of commands and subcommands.

pub mod arg;
pub mod registry;
pub mod spec;

// Re-export main types
pub use arg::*;
pub use registry::*;
pub use spec::*;
