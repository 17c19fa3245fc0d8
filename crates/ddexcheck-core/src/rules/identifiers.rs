//! Identifier format and uniqueness rules

use super::{Rule, RuleContext};
use crate::diagnostic::{Code, Diagnostic};
use crate::document::{DdexDocument, Node};
use crate::identifiers::{IdentifierKind, IdentifierValue, Verdict};
use std::collections::BTreeMap;

/// Every ISRC, GRid, ISAN, V-ISAN and ICPN must match its format
pub struct IdentifierFormatRule;

impl Rule for IdentifierFormatRule {
    fn id(&self) -> &'static str {
        "identifier-format"
    }

    fn description(&self) -> &'static str {
        "ISRC, GRid, ISAN, V-ISAN and ICPN values match their formats"
    }

    fn evaluate(&self, document: &DdexDocument, context: &RuleContext) -> Vec<Diagnostic> {
        document
            .identifiers()
            .filter_map(|(kind, node)| {
                let value = IdentifierValue::new(kind, node.value.as_str(), context.strict);
                let Verdict::InvalidFormat(reason) = value.verdict else {
                    return None;
                };
                Some(
                    Diagnostic::error(
                        kind.code(),
                        format!("Invalid {} '{}': {}", kind.label(), node.value, reason),
                        node.path.as_str(),
                    )
                    .with_context(node.value.as_str())
                    .with_suggestion(format!("Expected {}", kind.expected_pattern()))
                    .at(node.position),
                )
            })
            .collect()
    }
}

/// An identifier value of one kind may appear only once per message
pub struct DuplicateIdentifierRule;

impl Rule for DuplicateIdentifierRule {
    fn id(&self) -> &'static str {
        "duplicate-identifier"
    }

    fn description(&self) -> &'static str {
        "identifier values are unique per kind"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        // (kind, normalized value) -> occurrences in document order
        let mut occurrences: BTreeMap<(IdentifierKind, String), Vec<&Node>> = BTreeMap::new();
        let mut first_seen: Vec<(IdentifierKind, String)> = Vec::new();

        for (kind, node) in document.identifiers() {
            let normalized = kind.normalize(&node.value);
            if normalized.is_empty() {
                continue;
            }
            let key = (kind, normalized);
            let entry = occurrences.entry(key.clone()).or_default();
            if entry.is_empty() {
                first_seen.push(key);
            }
            entry.push(node);
        }

        first_seen
            .into_iter()
            .filter_map(|key| {
                let nodes = occurrences.get(&key)?;
                let (first, repeats) = nodes.split_first()?;
                let second = repeats.first()?;
                let (kind, value) = key;
                let repeated_at: Vec<&str> = repeats.iter().map(|n| n.path.as_str()).collect();

                Some(
                    Diagnostic::error(
                        Code::DuplicateIdentifier,
                        format!(
                            "{} '{}' appears {} times (first at {})",
                            kind.label(),
                            value,
                            nodes.len(),
                            first.path
                        ),
                        second.path.as_str(),
                    )
                    .with_context(format!("repeated at {}", repeated_at.join(", ")))
                    .with_suggestion(format!("Give each {} a distinct value", kind.label()))
                    .at(second.position),
                )
            })
            .collect()
    }
}
