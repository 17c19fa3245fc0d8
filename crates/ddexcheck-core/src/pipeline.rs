//! The single-document validation pipeline
//!
//! parse → message info → schema stage → rule stage → aggregate.
//! Only fatal conditions leave through `Err`; everything else becomes a
//! diagnostic in the returned [`ValidationResult`].
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::batch::DocumentSource;
use crate::config::PipelineConfig;
use crate::document::DdexDocument;
use crate::engine::RuleEngine;
use crate::error::Result;
use crate::result::{DiagnosticAggregator, ValidationResult};
use crate::rules::RuleContext;
use crate::schema::{registry_for, SchemaValidator};
use ddexcheck_schemas::{MessageInfo, SchemaRegistry, XmlDocument};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Validates documents against a shared, read-only schema registry
#[derive(Debug)]
pub struct Validator {
    config: PipelineConfig,
    registry: Arc<SchemaRegistry>,
    engine: RuleEngine,
}

impl Validator {
    pub fn new(config: PipelineConfig, registry: Arc<SchemaRegistry>) -> Self {
        let engine = RuleEngine::from_config(&config);
        Self {
            config,
            registry,
            engine,
        }
    }

    /// Validator over the built-in schemas plus the configured schema source
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let registry = registry_for(&config)?;
        Ok(Self::new(config, Arc::new(registry)))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Read a source and validate it
    pub fn validate_source(&self, source: &DocumentSource) -> Result<ValidationResult> {
        let text = source.read()?;
        self.validate_str(&source.id, &text)
    }

    /// Validate XML text
    #[instrument(skip(self, text), fields(source = %source_id))]
    pub fn validate_str(&self, source_id: &str, text: &str) -> Result<ValidationResult> {
        let start = Instant::now();
        let config = &self.config;

        let tree = XmlDocument::parse(text)?;
        let info = MessageInfo::from_document(&tree);
        debug!(
            message_type = %info.message_type,
            version = info.schema_version.as_deref().unwrap_or("unknown"),
            "Parsed document"
        );

        let mut aggregator = DiagnosticAggregator::new(source_id)
            .message_type(info.message_type.clone())
            .warnings_as_errors(config.warnings_as_errors);
        let mut schema_version = info.schema_version.clone();

        if config.enable_schema_validation {
            let schema = SchemaValidator::resolve(&self.registry, config, &info)?;
            schema_version = schema_version.or_else(|| Some(schema.version().to_string()));
            aggregator.add_schema_diagnostics(schema.validate(&tree)?);
        }

        let schema_errors = aggregator.schema_error_count();
        if config.enable_business_rules {
            if config.strict_mode && schema_errors > 0 {
                debug!(schema_errors, "Skipping business rules after schema errors in strict mode");
            } else {
                let document = DdexDocument::from_tree(&tree);
                let context = RuleContext {
                    strict: config.strict_mode,
                };
                aggregator.add_rule_diagnostics(self.engine.evaluate(&document, &context));
            }
        }

        let result = aggregator.schema_version(schema_version).finish(start.elapsed());
        info!(
            valid = result.is_valid(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            elapsed_ms = result.elapsed().as_millis() as u64,
            "Document validated"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Code;
    use crate::error::FatalError;
    use ddexcheck_schemas::SchemaSource;

    const VALID: &str = r#"<ern:NewReleaseMessage xmlns:ern="http://ddex.net/xml/ern/382" MessageSchemaVersionId="ern/382">
  <MessageHeader>
    <MessageThreadId>T1</MessageThreadId>
    <MessageId>M1</MessageId>
    <MessageSender><PartyId>PADPIDA0000000001</PartyId></MessageSender>
    <MessageRecipient><PartyId>PADPIDA0000000002</PartyId></MessageRecipient>
    <MessageCreatedDateTime>2024-01-15T10:00:00Z</MessageCreatedDateTime>
  </MessageHeader>
  <ResourceList>
    <SoundRecording>
      <ResourceReference>A1</ResourceReference>
      <ISRC>USRC17607839</ISRC>
    </SoundRecording>
  </ResourceList>
  <ReleaseList>
    <Release><ReleaseReference>R0</ReleaseReference><ReleaseResourceReference>A1</ReleaseResourceReference></Release>
  </ReleaseList>
</ern:NewReleaseMessage>"#;

    fn validator(config: PipelineConfig) -> Validator {
        Validator::from_config(config).unwrap()
    }

    #[test]
    fn test_schema_and_rules_merge() {
        let result = validator(PipelineConfig::default()).validate_str("a.xml", VALID).unwrap();
        assert!(result.is_valid(), "{:?}", result.diagnostics());
        assert_eq!(result.warning_count(), 1);
        assert!(result.has_code(Code::MissingDuration));
        assert_eq!(result.message_type(), Some("NewReleaseMessage"));
        assert_eq!(result.schema_version(), Some("3.8.2"));
    }

    #[test]
    fn test_schema_violation_does_not_stop_rules() {
        let xml = VALID.replace("<MessageId>M1</MessageId>", "");
        let result = validator(PipelineConfig::default()).validate_str("a.xml", &xml).unwrap();
        let codes: Vec<Code> = result.diagnostics().iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![Code::SchemaViolation, Code::MissingDuration]);
    }

    #[test]
    fn test_strict_mode_skips_rules_after_schema_errors() {
        let xml = VALID.replace("<MessageId>M1</MessageId>", "");
        let result = validator(PipelineConfig::default().with_strict_mode(true))
            .validate_str("a.xml", &xml)
            .unwrap();
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].code(), Code::SchemaViolation);
    }

    #[test]
    fn test_schema_only_and_rules_only() {
        let schema_only = validator(PipelineConfig::schema_only()).validate_str("a.xml", VALID).unwrap();
        assert!(schema_only.diagnostics().is_empty());

        let unknown_version = VALID.replace("ern/382", "ern/43");
        let rules_only = validator(PipelineConfig::rules_only())
            .validate_str("a.xml", &unknown_version)
            .unwrap();
        assert_eq!(rules_only.warning_count(), 1);
    }

    #[test]
    fn test_unresolvable_schema_is_fatal() {
        let unknown_version = VALID.replace("ern/382", "ern/43");
        let err = validator(PipelineConfig::default())
            .validate_str("a.xml", &unknown_version)
            .unwrap_err();
        assert!(matches!(err, FatalError::Config { .. }));
    }

    #[test]
    fn test_parse_error_is_fatal() {
        let err = validator(PipelineConfig::default())
            .validate_str("a.xml", "<NewReleaseMessage>")
            .unwrap_err();
        assert_eq!(err.code(), Code::FatalParseError);
    }

    #[test]
    fn test_explicit_schema_source() {
        let config = PipelineConfig::schema_only().with_schema_source(SchemaSource::Resource("ern-41".into()));
        let result = validator(config).validate_str("a.xml", VALID).unwrap();
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.schema_version(), Some("3.8.2"));
    }
}
