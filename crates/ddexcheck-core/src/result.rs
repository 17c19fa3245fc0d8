//! Validation results and the diagnostic aggregator
//!
//! A [`ValidationResult`] is built once through a [`DiagnosticAggregator`]
//! and is read-only afterwards, so its counts always agree with its
//! diagnostics.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::diagnostic::{Code, Diagnostic, Severity};
use crate::error::FatalError;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Outcome of validating one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    source_id: String,
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_version: Option<String>,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    fatal: Option<FatalError>,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl ValidationResult {
    /// Synthetic result standing in for a document whose pipeline aborted
    ///
    /// Carries exactly one error diagnostic with the fatal code and keeps the
    /// fatal error itself, so callers can tell it apart from ordinary findings.
    pub fn from_fatal(source_id: impl Into<String>, fatal: FatalError, elapsed: Duration) -> Self {
        let (line, column) = match &fatal {
            FatalError::Parse { line, column, .. } => (*line, *column),
            _ => (None, None),
        };
        let diagnostic = Diagnostic::error(fatal.code(), fatal.to_string(), "/").located(line, column);

        let mut aggregator = DiagnosticAggregator::new(source_id);
        aggregator.add_rule_diagnostics(vec![diagnostic]);
        let mut result = aggregator.finish(elapsed);
        result.fatal = Some(fatal);
        result
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// True iff no diagnostic has severity Error
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn message_type(&self) -> Option<&str> {
        self.message_type.as_deref()
    }

    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    /// Schema diagnostics first, then rule diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn info_count(&self) -> usize {
        self.infos().count()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The fatal error a synthetic result stands for
    pub fn fatal(&self) -> Option<&FatalError> {
        self.fatal.as_ref()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Info)
    }

    pub fn by_code(&self, code: Code) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code() == code)
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.by_code(code).next().is_some()
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity() == severity)
    }
}

/// Accumulates diagnostics for one document, then freezes them into a result
///
/// Schema diagnostics always precede rule diagnostics; each source keeps its
/// own order and nothing is dropped or deduplicated.
#[derive(Debug, Clone)]
pub struct DiagnosticAggregator {
    source_id: String,
    message_type: Option<String>,
    schema_version: Option<String>,
    schema: Vec<Diagnostic>,
    rules: Vec<Diagnostic>,
    warnings_as_errors: bool,
}

impl DiagnosticAggregator {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            message_type: None,
            schema_version: None,
            schema: Vec::new(),
            rules: Vec::new(),
            warnings_as_errors: false,
        }
    }

    pub fn message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn schema_version(mut self, version: Option<String>) -> Self {
        self.schema_version = version;
        self
    }

    /// Report warnings with error severity
    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }

    pub fn add_schema_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.schema.extend(diagnostics);
    }

    pub fn add_rule_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.rules.extend(diagnostics);
    }

    pub fn schema_error_count(&self) -> usize {
        self.schema.iter().filter(|d| d.is_error()).count()
    }

    /// Merge, tally and freeze
    pub fn finish(self, elapsed: Duration) -> ValidationResult {
        let promote = self.warnings_as_errors;
        let diagnostics: Vec<Diagnostic> = self
            .schema
            .into_iter()
            .chain(self.rules)
            .map(|diagnostic| {
                if promote && diagnostic.severity() == Severity::Warning {
                    diagnostic.escalated()
                } else {
                    diagnostic
                }
            })
            .collect();

        let error_count = diagnostics.iter().filter(|d| d.severity() == Severity::Error).count();
        let warning_count = diagnostics.iter().filter(|d| d.severity() == Severity::Warning).count();

        ValidationResult {
            source_id: self.source_id,
            is_valid: error_count == 0,
            message_type: self.message_type,
            schema_version: self.schema_version,
            diagnostics,
            error_count,
            warning_count,
            elapsed,
            fatal: None,
        }
    }
}
