//! Fatal conditions that abort a document's pipeline
//!
//! Everything that is not fatal is a [`Diagnostic`](crate::Diagnostic) and
//! accumulates into the result instead.

use crate::diagnostic::Code;
use ddexcheck_schemas::{LoaderError, TreeError};
use serde::Serialize;
use thiserror::Error;

/// A condition that stops validation of one document
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FatalError {
    /// The document could not be parsed into a tree
    #[error("Failed to parse document: {message}")]
    Parse {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// The schema resource is missing, unreadable or unusable
    #[error("Configuration error: {message}")]
    Config { message: String, transient: bool },

    /// Validation exceeded the per-file time limit
    #[error("Validation timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    Timeout { elapsed_ms: u64, limit_ms: u64 },

    /// Validation panicked
    #[error("Validation aborted: {message}")]
    Panic { message: String },
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, FatalError>;

impl FatalError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            transient: false,
        }
    }

    /// Catalog code used when this failure is reported as a diagnostic
    pub fn code(&self) -> Code {
        match self {
            FatalError::Parse { .. } => Code::FatalParseError,
            FatalError::Config { .. } | FatalError::Timeout { .. } | FatalError::Panic { .. } => {
                Code::FatalConfigError
            }
        }
    }

    /// Whether re-running the same document might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FatalError::Config { transient, .. } => *transient,
            FatalError::Timeout { .. } => true,
            FatalError::Parse { .. } | FatalError::Panic { .. } => false,
        }
    }
}

impl From<TreeError> for FatalError {
    fn from(error: TreeError) -> Self {
        Self::Parse {
            message: error.message,
            line: Some(error.line),
            column: Some(error.column),
        }
    }
}

impl From<LoaderError> for FatalError {
    fn from(error: LoaderError) -> Self {
        Self::Config {
            transient: error.is_transient(),
            message: error.to_string(),
        }
    }
}
