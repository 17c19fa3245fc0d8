//! Rule engine: runs the catalog over one document
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::config::PipelineConfig;
use crate::diagnostic::Diagnostic;
use crate::document::DdexDocument;
use crate::rules::{default_rules, Rule, RuleContext};
use tracing::{debug, warn};

/// Ordered set of enabled rules
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine").field("rules", &self.rule_ids()).finish()
    }
}

impl RuleEngine {
    /// Engine with the full catalog
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Engine with an explicit rule list, run in the given order
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Full catalog minus the rules the configuration disables
    pub fn from_config(config: &PipelineConfig) -> Self {
        let catalog = default_rules();
        for id in &config.disabled_rules {
            if !catalog.iter().any(|rule| rule.id() == id) {
                warn!(rule = %id, "Ignoring unknown rule id in disabled_rules");
            }
        }

        let rules = catalog
            .into_iter()
            .filter(|rule| !config.is_rule_disabled(rule.id()))
            .collect();
        Self::with_rules(rules)
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Run every rule and concatenate findings in rule order
    ///
    /// Rules never short-circuit one another.
    pub fn evaluate(&self, document: &DdexDocument, context: &RuleContext) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            let found = rule.evaluate(document, context);
            if !found.is_empty() {
                debug!(rule = rule.id(), count = found.len(), "Rule reported findings");
            }
            diagnostics.extend(found);
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Code;

    const XML: &str = "<NewReleaseMessage>\
        <ResourceList><SoundRecording><ISRC>BAD</ISRC></SoundRecording></ResourceList>\
        </NewReleaseMessage>";

    #[test]
    fn test_runs_all_rules_in_catalog_order() {
        let document = DdexDocument::parse(XML).unwrap();
        let diagnostics = RuleEngine::new().evaluate(&document, &RuleContext::default());
        let codes: Vec<Code> = diagnostics.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![Code::InvalidIsrc, Code::MissingDuration]);
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let config = PipelineConfig::default()
            .with_disabled_rule("duration-presence")
            .with_disabled_rule("no-such-rule");
        let engine = RuleEngine::from_config(&config);
        assert!(!engine.rule_ids().contains(&"duration-presence"));
        assert_eq!(engine.rule_ids().len(), 8);

        let document = DdexDocument::parse(XML).unwrap();
        let diagnostics = engine.evaluate(&document, &RuleContext::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Code::InvalidIsrc);
    }

    #[test]
    fn test_rule_order_only_changes_report_order() {
        let document = DdexDocument::parse(XML).unwrap();
        let mut reversed = default_rules();
        reversed.reverse();
        let forward = RuleEngine::new().evaluate(&document, &RuleContext::default());
        let mut backward = RuleEngine::with_rules(reversed).evaluate(&document, &RuleContext::default());
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
