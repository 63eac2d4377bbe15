//! Declared types, converted values and type resolution
//!
//! This module maps declared parameter types to converters and holds the
//! values those converters produce.

pub mod resolve;
pub mod tag;
pub mod value;

// Re-export main types
pub use resolve::*;
pub use tag::*;
pub use value::*;
