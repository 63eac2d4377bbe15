//! Error types for radicli

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for radicli operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Main error type for radicli
#[derive(Error, Debug)]
pub enum CliError {
    /// Command definitions that can't be turned into a CLI
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Syntax errors reported by clap (unknown flag, missing argument, ...)
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// The first token didn't name any registered command
    #[error("Can't find command '{name}'. Available: {}", .available.join(", "))]
    CommandNotFound { name: String, available: Vec<String> },

    /// A syntactically valid token was rejected by its converter
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The invoked command failed and no error handler claimed the error
    #[error("{0:#}")]
    Application(anyhow::Error),

    /// Static export errors
    #[error(transparent)]
    Static(#[from] StaticError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Errors raised while registering commands. Always fatal at startup.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Unsupported type for '{arg}': {ty}")]
    UnsupportedType { arg: String, ty: String },

    #[error("argument not found in signature for '{command}': {arg}")]
    UnknownArgument { command: String, arg: String },

    #[error(
        "Invalid positional ordering in '{command}': required argument '{arg}' follows an optional one"
    )]
    PositionalOrder { command: String, arg: String },

    #[error("Invalid argument '{arg}': {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Duplicate flag '{flag}' in '{command}'")]
    DuplicateFlag { command: String, flag: String },
}

/// The type resolver found no interpretation for a type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no converter available for type {0}")]
pub struct UnresolvableType(pub String);

/// A converter rejected a raw token
#[derive(Error, Debug)]
#[error("argument {arg}: {message}")]
pub struct ConversionError {
    /// The flag (or positional name) the token was given for
    pub arg: String,
    /// The raw token
    pub value: String,
    /// Underlying converter message
    pub message: String,
    /// Usage line of the command, printed alongside the error
    pub usage: String,
}

/// Errors from typed access into parsed values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("no value for argument '{0}'")]
    Missing(String),

    #[error("argument '{name}' holds {found}, expected {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: String,
    },
}

/// Errors reading or writing a static export
#[derive(Error, Debug)]
pub enum StaticError {
    #[error("Not a valid file path: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to read static data from '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Failed to write static data: {0}")]
    Write(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Specialized result type for registration
pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;

/// Specialized result type for static export operations
pub type StaticResult<T> = std::result::Result<T, StaticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_not_found_message() {
        let err = CliError::CommandNotFound {
            name: "nope".to_string(),
            available: vec!["hello".to_string(), "world".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Can't find command 'nope'. Available: hello, world"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_conversion_error_message() {
        let err = ConversionError {
            arg: "--age".to_string(),
            value: "abc".to_string(),
            message: "invalid int value: 'abc'".to_string(),
            usage: String::new(),
        };
        assert_eq!(err.to_string(), "argument --age: invalid int value: 'abc'");
    }
}
