//! Schema document parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::structure::StructuralSchema;
use jsonschema::Validator;
use serde_json::Value;
use std::path::Path;

const META_SCHEMA: &str = include_str!("../../schemas/structural-schema.schema.json");

/// Supported file formats for schema documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Parser turning schema documents into [`StructuralSchema`] values
pub struct SchemaParser {
    meta: Validator,
}

impl std::fmt::Debug for SchemaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaParser").finish_non_exhaustive()
    }
}

impl SchemaParser {
    /// Create a parser with the embedded meta-schema compiled
    pub fn new() -> LoaderResult<Self> {
        let path = Path::new("structural-schema.schema.json");
        let meta: Value = serde_json::from_str(META_SCHEMA)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))?;
        let meta = Validator::new(&meta)
            .map_err(|e| LoaderError::invalid_definition(path.to_path_buf(), e.to_string()))?;
        Ok(Self { meta })
    }

    /// Parse a schema file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<StructuralSchema> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse schema content with explicit format
    ///
    /// `path` is only used for error context.
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<StructuralSchema> {
        let value = match format {
            Format::Yaml => self.parse_yaml(content, path)?,
            Format::Json => self.parse_json(content, path)?,
        };
        self.check_definition(&value, path)?;

        serde_json::from_value(value)
            .map_err(|e| LoaderError::invalid_definition(path.to_path_buf(), e.to_string()))
    }

    fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    fn check_definition(&self, value: &Value, path: &Path) -> LoaderResult<()> {
        let problems: Vec<String> = self
            .meta
            .iter_errors(value)
            .map(|error| error.to_string())
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LoaderError::invalid_definition(path.to_path_buf(), problems.join("; ")))
        }
    }
}
