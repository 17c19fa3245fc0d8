//! DDEXCheck Core - validation pipeline for DDEX release metadata
//!
//! This crate validates DDEX ERN messages in two independent stages and
//! merges their findings into one report per document:
//!
//! - **Schema stage**: structural conformance against the schema for the
//!   document's ERN version, resolved from a shared [`SchemaRegistry`]
//! - **Business rules**: identifier formats, duplicates, references, deal
//!   completeness, durations, dates, territory and language codes
//! - **Aggregation**: every finding becomes a [`Diagnostic`] with a code from
//!   the closed [`Code`] catalog; a document is valid iff none has severity Error
//! - **Batch orchestration**: bounded-parallel runs with input-ordered results
//!   and stop-on-error or continue-on-error policies
//!
//! Only parse and configuration failures are fatal ([`FatalError`]).
//!
//! # Example
//!
//! ```rust
//! use ddexcheck_core::{Code, PipelineConfig, Validator};
//!
//! let validator = Validator::from_config(PipelineConfig::rules_only()).unwrap();
//! let result = validator
//!     .validate_str(
//!         "release.xml",
//!         "<NewReleaseMessage><ResourceList><SoundRecording>\
//!          <ISRC>USRC17607839</ISRC></SoundRecording></ResourceList></NewReleaseMessage>",
//!     )
//!     .unwrap();
//!
//! assert!(result.is_valid());
//! assert!(result.has_code(Code::MissingDuration));
//! ```
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

pub mod batch;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod engine;
pub mod error;
pub mod formats;
pub mod identifiers;
pub mod pipeline;
pub mod result;
pub mod rules;
pub mod schema;
pub mod statistics;

// Re-export main types for convenience
pub use batch::{validate_batch, BatchEntry, BatchOrchestrator, BatchReport, DocumentSource, SourceContent};
pub use config::PipelineConfig;
pub use diagnostic::{Code, Diagnostic, Severity, UnknownCode};
pub use document::{DdexDocument, Node, NodeKind};
pub use engine::RuleEngine;
pub use error::{FatalError, Result};
pub use identifiers::{IdentifierKind, Verdict};
pub use pipeline::Validator;
pub use result::{DiagnosticAggregator, ValidationResult};
pub use rules::{default_rules, Rule, RuleContext};
pub use schema::SchemaValidator;
pub use statistics::BatchStatistics;

pub use ddexcheck_schemas::{MessageInfo, SchemaRegistry, SchemaSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
