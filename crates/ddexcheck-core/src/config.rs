//! Pipeline configuration
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use ddexcheck_schemas::SchemaSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every option the validation pipeline recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Schema to validate against; detected from the document when unset
    pub schema_source: Option<SchemaSource>,
    /// Run the structural schema stage (false = rule-only mode)
    pub enable_schema_validation: bool,
    /// Run the business-rule stage (false = schema-only mode)
    pub enable_business_rules: bool,
    /// Verify GRid check characters and skip rules once the schema stage found errors
    pub strict_mode: bool,
    /// Batch only: record fatal errors per document instead of stopping
    pub continue_on_error: bool,
    /// Report warnings with error severity
    pub warnings_as_errors: bool,
    /// Rule ids excluded from the business-rule stage
    pub disabled_rules: Vec<String>,
    /// Batch worker count; available parallelism when unset
    pub workers: Option<usize>,
    /// Per-document time limit in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema_source: None,
            enable_schema_validation: true,
            enable_business_rules: true,
            strict_mode: false,
            continue_on_error: false,
            warnings_as_errors: false,
            disabled_rules: Vec::new(),
            workers: None,
            timeout_ms: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Business rules only, no schema stage
    pub fn rules_only() -> Self {
        Self {
            enable_schema_validation: false,
            ..Self::default()
        }
    }

    /// Schema stage only, no business rules
    pub fn schema_only() -> Self {
        Self {
            enable_business_rules: false,
            ..Self::default()
        }
    }

    pub fn with_schema_source(mut self, source: SchemaSource) -> Self {
        self.schema_source = Some(source);
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_warnings_as_errors(mut self, warnings_as_errors: bool) -> Self {
        self.warnings_as_errors = warnings_as_errors;
        self
    }

    pub fn with_disabled_rule(mut self, id: impl Into<String>) -> Self {
        self.disabled_rules.push(id.into());
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Worker count for batch runs, never zero
    pub fn worker_count(&self) -> usize {
        self.workers
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1)
    }

    pub fn is_rule_disabled(&self, id: &str) -> bool {
        self.disabled_rules.iter().any(|disabled| disabled == id)
    }
}
