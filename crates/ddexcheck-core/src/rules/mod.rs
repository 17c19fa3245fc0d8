//! Business rule catalog
//!
//! Each rule is an independent check over a [`DdexDocument`]. Rules share no
//! mutable state and never look at each other's output, so the catalog order
//! only decides the order diagnostics are reported in.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

pub mod codes;
pub mod dates;
pub mod deals;
pub mod durations;
pub mod identifiers;
pub mod references;

pub use codes::{LanguageCodeRule, TerritoryCodeRule};
pub use dates::DateFormatRule;
pub use deals::DealCompletenessRule;
pub use durations::{DurationFormatRule, DurationPresenceRule};
pub use identifiers::{DuplicateIdentifierRule, IdentifierFormatRule};
pub use references::ResourceReferenceRule;

use crate::diagnostic::Diagnostic;
use crate::document::DdexDocument;

/// Evaluation settings shared by every rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleContext {
    /// Enables checksum verification where a format defines one
    pub strict: bool,
}

/// A single business rule
pub trait Rule: Send + Sync {
    /// Stable identifier used to disable the rule
    fn id(&self) -> &'static str;

    /// One-line summary for listings
    fn description(&self) -> &'static str;

    /// Findings for one document, in document order
    fn evaluate(&self, document: &DdexDocument, context: &RuleContext) -> Vec<Diagnostic>;
}

/// The full catalog in reporting order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(IdentifierFormatRule),
        Box::new(DuplicateIdentifierRule),
        Box::new(ResourceReferenceRule),
        Box::new(DealCompletenessRule),
        Box::new(DurationPresenceRule),
        Box::new(DurationFormatRule),
        Box::new(DateFormatRule),
        Box::new(TerritoryCodeRule),
        Box::new(LanguageCodeRule),
    ]
}
