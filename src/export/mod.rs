//! Static export
//!
//! This module serializes a CLI to a static file and runs it back without
//! the live program.

pub mod data;
pub mod runner;

// Re-export main types
pub use data::{StaticArg, StaticCommand, StaticData, StaticGroup};
pub use runner::StaticCli;
