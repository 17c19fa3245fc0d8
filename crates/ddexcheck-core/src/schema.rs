//! Schema stage: resolves a schema and normalizes checker output
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::config::PipelineConfig;
use crate::diagnostic::{Code, Diagnostic};
use crate::error::{FatalError, Result};
use ddexcheck_schemas::loader::{builtin_for_version, DEFAULT_RESOURCE};
use ddexcheck_schemas::{
    MessageInfo, SchemaDescriptor, SchemaRegistry, SchemaSource, SchemaViolation, ViolationKind, XmlDocument,
};
use tracing::debug;

/// Wraps one resolved schema and turns its violations into diagnostics
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'a> {
    descriptor: &'a SchemaDescriptor,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(descriptor: &'a SchemaDescriptor) -> Self {
        Self { descriptor }
    }

    /// Pick the schema for a document
    ///
    /// An explicit `schema_source` wins. Otherwise the detected version is
    /// looked up, and a document without any version falls back to the
    /// default built-in resource. Anything unresolvable is a configuration error.
    pub fn resolve(registry: &'a SchemaRegistry, config: &PipelineConfig, info: &MessageInfo) -> Result<Self> {
        if let Some(source) = &config.schema_source {
            return registry
                .find_by_source(source)
                .map(Self::new)
                .ok_or_else(|| FatalError::config(format!("schema '{source}' is not loaded")));
        }

        match &info.schema_version {
            Some(version) => registry
                .get(version)
                .map(Self::new)
                .ok_or_else(|| FatalError::config(format!("no schema registered for ERN version {version}"))),
            None => {
                let fallback = SchemaSource::Resource(DEFAULT_RESOURCE.to_string());
                registry
                    .find_by_source(&fallback)
                    .map(Self::new)
                    .ok_or_else(|| FatalError::config("document declares no ERN version and no default schema is loaded"))
            }
        }
    }

    pub fn version(&self) -> &str {
        &self.descriptor.version
    }

    /// Structural diagnostics, always severity Error, in document order
    pub fn validate(&self, document: &XmlDocument) -> Result<Vec<Diagnostic>> {
        let violations = self
            .descriptor
            .checker()
            .check(document)
            .map_err(|e| FatalError::config(e.to_string()))?;
        debug!(version = %self.descriptor.version, count = violations.len(), "Schema check finished");
        Ok(violations.iter().map(violation_to_diagnostic).collect())
    }
}

/// Normalize a structural violation into the shared diagnostic shape
pub fn violation_to_diagnostic(violation: &SchemaViolation) -> Diagnostic {
    let suggestion = match violation.kind {
        ViolationKind::UnexpectedRoot => "Check the message type against the schema version",
        ViolationKind::NamespaceMismatch => "Declare the namespace of the schema version on the root element",
        ViolationKind::MissingElement => "Add the required element",
        ViolationKind::UnexpectedElement => "Remove the element or move it to where the schema allows it",
        ViolationKind::TooManyOccurrences => "Remove the surplus occurrences",
        ViolationKind::OutOfOrder => "Reorder the children to follow the schema sequence",
        ViolationKind::MissingAttribute => "Add the required attribute",
        ViolationKind::InvalidValue => "Correct the element value",
    };

    Diagnostic::error(Code::SchemaViolation, violation.message.as_str(), violation.path.as_str())
        .with_context(format!("{} at {}", violation.kind, violation.position))
        .with_suggestion(suggestion)
        .at(violation.position)
}

/// Registry holding the built-in schemas plus the configured schema source
pub fn registry_for(config: &PipelineConfig) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::with_builtin()?;
    if let Some(source) = &config.schema_source {
        if registry.find_by_source(source).is_none() {
            registry.load(source)?;
        }
    }
    Ok(registry)
}

/// Whether a built-in schema exists for a detected version
pub fn has_builtin_schema(version: &str) -> bool {
    builtin_for_version(version).is_some()
}
