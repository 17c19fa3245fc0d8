//! Deal completeness

use super::{Rule, RuleContext};
use crate::diagnostic::{Code, Diagnostic};
use crate::document::{DdexDocument, NodeKind};

/// Each deal needs content, territory, start date and usage terms
pub struct DealCompletenessRule;

impl Rule for DealCompletenessRule {
    fn id(&self) -> &'static str {
        "deal-completeness"
    }

    fn description(&self) -> &'static str {
        "deals reference content and carry territory, start date and usage terms"
    }

    fn evaluate(&self, document: &DdexDocument, _context: &RuleContext) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for node in document.nodes() {
            let NodeKind::Deal(terms) = node.kind else {
                continue;
            };
            let missing = [
                (
                    terms.references_content,
                    "does not reference any resource or release",
                    "Add a DealResourceReference, or a DealReleaseReference on the enclosing ReleaseDeal",
                ),
                (
                    terms.has_territory,
                    "has no territory",
                    "Add a TerritoryCode (or Worldwide) to the deal terms",
                ),
                (
                    terms.has_start_date,
                    "has no validity start date",
                    "Add a ValidityPeriod with a StartDate to the deal terms",
                ),
                (
                    terms.has_usage,
                    "has no usage terms",
                    "Add a UseType or CommercialModelType to the deal terms",
                ),
            ];

            for (present, problem, suggestion) in missing {
                if !present {
                    diagnostics.push(
                        Diagnostic::error(Code::IncompleteDeal, format!("Deal {problem}"), node.path.as_str())
                            .with_suggestion(suggestion)
                            .at(node.position),
                    );
                }
            }
        }

        diagnostics
    }
}
