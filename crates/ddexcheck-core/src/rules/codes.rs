//! Territory and language codes

use super::{Rule, RuleContext};
use crate::diagnostic::{Code, Diagnostic};
use crate::document::{DdexDocument, Node, NodeKind};
use crate::formats::{validate_language, validate_territory};
use crate::identifiers::Verdict;

fn check_codes(
    document: &DdexDocument,
    kind: NodeKind,
    code: Code,
    validate: fn(&str) -> Verdict,
    suggestion: &str,
) -> Vec<Diagnostic> {
    document
        .nodes()
        .iter()
        .filter(|node| node.kind == kind)
        .filter_map(|node: &Node| match validate(&node.value) {
            Verdict::Valid => None,
            Verdict::InvalidFormat(reason) => Some(
                Diagnostic::error(code, reason, node.path.as_str())
                    .with_context(node.value.as_str())
                    .with_suggestion(suggestion)
                    .at(node.position),
            ),
        })
        .collect()
}

/// Territory codes must be ISO 3166-1 alpha-2 or `Worldwide`
pub struct TerritoryCodeRule;

impl Rule for TerritoryCodeRule {
    fn id(&self) -> &'static str {
        "territory-code"
    }

    fn description(&self) -> &'static str {
        "territory codes are ISO 3166-1 alpha-2 or Worldwide"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        check_codes(
            document,
            NodeKind::Territory,
            Code::InvalidRegionCode,
            validate_territory,
            "Use a two-letter ISO 3166-1 code such as US or Worldwide",
        )
    }
}

/// Language codes must be ISO 639 with an optional territory suffix
pub struct LanguageCodeRule;

impl Rule for LanguageCodeRule {
    fn id(&self) -> &'static str {
        "language-code"
    }

    fn description(&self) -> &'static str {
        "language codes are ISO 639-1/639-2, optionally with a territory"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        check_codes(
            document,
            NodeKind::Language,
            Code::InvalidLanguageCode,
            validate_language,
            "Use an ISO 639 code such as en, zho or en-US",
        )
    }
}
