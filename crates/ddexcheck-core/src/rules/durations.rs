//! Duration presence and format

use super::{Rule, RuleContext};
use crate::diagnostic::{Code, Diagnostic};
use crate::document::{DdexDocument, NodeKind};
use crate::formats::validate_duration;
use crate::identifiers::Verdict;

/// Sound recordings and videos should state their duration
pub struct DurationPresenceRule;

impl Rule for DurationPresenceRule {
    fn id(&self) -> &'static str {
        "duration-presence"
    }

    fn description(&self) -> &'static str {
        "sound recordings and videos carry a duration (advisory)"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        document
            .nodes()
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Resource {
                    kind,
                    has_duration: false,
                    ..
                } if kind.is_timed() => Some(
                    Diagnostic::warning(Code::MissingDuration, format!("{kind} has no Duration"), node.path.as_str())
                        .with_suggestion("Add a Duration such as PT3M45S")
                        .at(node.position),
                ),
                _ => None,
            })
            .collect()
    }
}

/// Durations must be ISO-8601 `PT#H#M#S`
pub struct DurationFormatRule;

impl Rule for DurationFormatRule {
    fn id(&self) -> &'static str {
        "duration-format"
    }

    fn description(&self) -> &'static str {
        "durations are ISO-8601 PT#H#M#S values"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        document
            .nodes()
            .iter()
            .filter(|node| node.kind == NodeKind::Duration)
            .filter_map(|node| match validate_duration(&node.value) {
                Verdict::Valid => None,
                Verdict::InvalidFormat(reason) => Some(
                    Diagnostic::error(Code::InvalidDuration, format!("Invalid duration: {reason}"), node.path.as_str())
                        .with_context(node.value.as_str())
                        .with_suggestion("Use PT#H#M#S, for example PT3M45S")
                        .at(node.position),
                ),
            })
            .collect()
    }
}
