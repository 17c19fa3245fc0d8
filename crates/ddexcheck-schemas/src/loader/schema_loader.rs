//! Schema loader for files and embedded resources
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::{
    error::{LoaderError, LoaderResult},
    parser::{Format, SchemaParser},
};
use crate::registry::SchemaSource;
use crate::structure::StructuralSchema;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Schemas compiled into the binary, by resource id
pub const BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    ("ern-382", include_str!("../../schemas/ern-382.yaml")),
    ("ern-41", include_str!("../../schemas/ern-41.yaml")),
];

/// Resource id used when no version can be detected
pub const DEFAULT_RESOURCE: &str = "ern-382";

/// Loads structural schemas from paths or embedded resources
#[derive(Debug, Default)]
pub struct SchemaLoader {
    parser: Option<SchemaParser>,
}

impl SchemaLoader {
    /// Create a new schema loader; the meta-schema is compiled on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a schema from its source
    pub fn load(&mut self, source: &SchemaSource) -> LoaderResult<StructuralSchema> {
        match source {
            SchemaSource::Path(path) => {
                debug!(path = %path.display(), "Loading schema file");
                self.parser()?.parse_file(path)
            }
            SchemaSource::Resource(id) => {
                debug!(resource = %id, "Loading built-in schema");
                let content = builtin_content(id)?;
                let label = PathBuf::from(format!("builtin:{id}"));
                self.parser()?.parse_content(content, Format::Yaml, &label)
            }
        }
    }

    /// Find the schema file for a version inside a directory
    ///
    /// Candidates, in order: `ddex_<3-8-2>.*`, `ern-main-<3.8.2>.*`, `ern-main.*`.
    pub fn discover(dir: &Path, version: &str) -> LoaderResult<PathBuf> {
        let dashed = version.replace('.', "-");
        let stems = [
            format!("ddex_{dashed}"),
            format!("ern-main-{version}"),
            "ern-main".to_string(),
        ];

        for stem in &stems {
            for format in [Format::Yaml, Format::Json] {
                for extension in format.extensions() {
                    let candidate = dir.join(format!("{stem}.{extension}"));
                    if candidate.is_file() {
                        debug!(path = %candidate.display(), version, "Discovered schema file");
                        return Ok(candidate);
                    }
                }
            }
        }

        Err(LoaderError::NotFound {
            version: version.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    fn parser(&mut self) -> LoaderResult<&SchemaParser> {
        if self.parser.is_none() {
            self.parser = Some(SchemaParser::new()?);
        }
        self.parser.as_ref().ok_or_else(|| {
            LoaderError::invalid_definition(PathBuf::from("structural-schema.schema.json"), "meta-schema unavailable")
        })
    }
}

/// Embedded schema text for a resource id
pub fn builtin_content(id: &str) -> LoaderResult<&'static str> {
    BUILTIN_SCHEMAS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, content)| *content)
        .ok_or_else(|| LoaderError::UnknownResource { id: id.to_string() })
}

/// Resource id of the built-in schema for a dotted version, if there is one
pub fn builtin_for_version(version: &str) -> Option<&'static str> {
    let compact: String = version.chars().filter(|c| c.is_ascii_digit()).collect();
    let id = format!("ern-{compact}");
    BUILTIN_SCHEMAS
        .iter()
        .map(|(name, _)| *name)
        .find(|name| *name == id)
}
