//! Error types for schema loading operations
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Failures while turning a schema resource into a usable checker
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read schema '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML schema '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON schema '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported schema format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The schema document does not describe a structural schema
    #[error("Invalid schema definition in '{path}': {reason}")]
    InvalidDefinition { path: PathBuf, reason: String },

    /// No embedded schema with this resource id
    #[error("Unknown built-in schema resource '{id}'")]
    UnknownResource { id: String },

    /// Nothing matching the version was found during discovery
    #[error("No schema for version '{version}' found in '{dir}'")]
    NotFound { version: String, dir: PathBuf },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Create an invalid definition error
    pub fn invalid_definition(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            path,
            reason: reason.into(),
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::IoError { path, .. } => Some(path),
            Self::YamlParseError { path, .. } => Some(path),
            Self::JsonParseError { path, .. } => Some(path),
            Self::UnsupportedFormat { path } => Some(path),
            Self::InvalidDefinition { path, .. } => Some(path),
            Self::NotFound { dir, .. } => Some(dir),
            Self::UnknownResource { .. } => None,
        }
    }

    /// Whether retrying the same load could succeed
    ///
    /// Only I/O failures qualify; a malformed schema stays malformed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::IoError { .. })
    }
}
