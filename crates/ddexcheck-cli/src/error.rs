//! Error types and handling for the CLI
//!
//! Validation findings are not errors here: an invalid document is a report
//! plus a non-zero exit code. These variants cover everything that keeps the
//! CLI from producing a report at all.

use ddexcheck_core::FatalError;
use ddexcheck_schemas::LoaderError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Fatal error from the validation pipeline
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// Schema resource could not be loaded
    #[error("Schema error: {0}")]
    Schema(#[from] LoaderError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Directory expansion matched nothing
    #[error("No files matching '{pattern}' found in {}", path.display())]
    NoInputFiles { path: PathBuf, pattern: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// One or more documents are invalid or could not be validated
    #[error("{invalid} of {total} document(s) failed validation")]
    ValidationFailed { invalid: usize, total: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Process exit code: 1 for anything that did not end in an all-valid report
    ///
    /// Usage errors are reported by clap itself with code 2 before any of
    /// these can occur.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether the error was already reported through the output writer
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
