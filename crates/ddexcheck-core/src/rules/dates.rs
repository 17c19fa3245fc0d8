//! Date and date-time formats

use super::{Rule, RuleContext};
use crate::diagnostic::{Code, Diagnostic};
use crate::document::{DateKind, DdexDocument, NodeKind};
use crate::formats::{validate_date, validate_date_time};
use crate::identifiers::Verdict;

/// Dates must be `YYYY-MM-DD` calendar dates, date-times ISO-8601
pub struct DateFormatRule;

impl Rule for DateFormatRule {
    fn id(&self) -> &'static str {
        "date-format"
    }

    fn description(&self) -> &'static str {
        "dates are YYYY-MM-DD and date-times are ISO-8601"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        document
            .nodes()
            .iter()
            .filter_map(|node| {
                let NodeKind::Date(kind) = node.kind else {
                    return None;
                };
                let (verdict, expected) = match kind {
                    DateKind::Date => (validate_date(&node.value), "YYYY-MM-DD, for example 2024-03-01"),
                    DateKind::DateTime => (
                        validate_date_time(&node.value),
                        "YYYY-MM-DDThh:mm:ss with an optional offset, for example 2024-03-01T12:00:00Z",
                    ),
                };
                match verdict {
                    Verdict::Valid => None,
                    Verdict::InvalidFormat(reason) => Some(
                        Diagnostic::error(Code::InvalidDate, format!("Invalid date: {reason}"), node.path.as_str())
                            .with_context(node.value.as_str())
                            .with_suggestion(format!("Use {expected}"))
                            .at(node.position),
                    ),
                }
            })
            .collect()
    }
}
