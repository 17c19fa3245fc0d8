//! Structural conformance checking against a [`StructuralSchema`]
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use super::model::StructuralSchema;
use crate::tree::{Position, XmlDocument, XmlElement};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Category of a structural violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    UnexpectedRoot,
    NamespaceMismatch,
    MissingElement,
    UnexpectedElement,
    TooManyOccurrences,
    OutOfOrder,
    MissingAttribute,
    InvalidValue,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationKind::UnexpectedRoot => "unexpected-root",
            ViolationKind::NamespaceMismatch => "namespace-mismatch",
            ViolationKind::MissingElement => "missing-element",
            ViolationKind::UnexpectedElement => "unexpected-element",
            ViolationKind::TooManyOccurrences => "too-many-occurrences",
            ViolationKind::OutOfOrder => "out-of-order",
            ViolationKind::MissingAttribute => "missing-attribute",
            ViolationKind::InvalidValue => "invalid-value",
        };
        f.write_str(name)
    }
}

/// One structural non-conformance, located by path and source position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub kind: ViolationKind,
    pub message: String,
    pub path: String,
    pub position: Position,
}

impl SchemaViolation {
    fn at(kind: ViolationKind, element: &XmlElement, message: String) -> Self {
        Self {
            kind,
            message,
            path: element.path.clone(),
            position: element.position,
        }
    }
}

/// A checker could not run at all
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("schema checker failed: {message}")]
pub struct CheckerError {
    pub message: String,
}

/// Anything that can check a parsed document for structural conformance
pub trait ConformanceChecker: Send + Sync {
    /// Schema version this checker enforces
    fn version(&self) -> &str;

    /// Check the document; violations come back in document order
    fn check(&self, document: &XmlDocument) -> Result<Vec<SchemaViolation>, CheckerError>;
}

impl ConformanceChecker for StructuralSchema {
    fn version(&self) -> &str {
        &self.version
    }

    fn check(&self, document: &XmlDocument) -> Result<Vec<SchemaViolation>, CheckerError> {
        Ok(self.violations(document))
    }
}

impl StructuralSchema {
    /// Collect every violation in the document
    pub fn violations(&self, document: &XmlDocument) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        let root = document.root();

        if !self.roots.iter().any(|r| *r == root.name) {
            violations.push(SchemaViolation::at(
                ViolationKind::UnexpectedRoot,
                root,
                format!(
                    "root element <{}> is not a message type of schema {} (expected one of: {})",
                    root.name,
                    self.version,
                    self.roots.join(", ")
                ),
            ));
            return violations;
        }

        if let Some(expected) = &self.namespace {
            match root.namespace() {
                Some(actual) if actual == expected => {}
                Some(actual) => violations.push(SchemaViolation::at(
                    ViolationKind::NamespaceMismatch,
                    root,
                    format!("namespace '{actual}' does not match schema namespace '{expected}'"),
                )),
                None => violations.push(SchemaViolation::at(
                    ViolationKind::NamespaceMismatch,
                    root,
                    format!("root element has no namespace, expected '{expected}'"),
                )),
            }
        }

        for element in document.elements() {
            self.check_element(element, &mut violations);
        }

        violations
    }

    fn check_element(&self, element: &XmlElement, violations: &mut Vec<SchemaViolation>) {
        let Some(rule) = self.elements.get(&element.name) else {
            return;
        };

        for attribute in &rule.required_attributes {
            if element.attribute(attribute).is_none() {
                violations.push(SchemaViolation::at(
                    ViolationKind::MissingAttribute,
                    element,
                    format!("<{}> is missing required attribute '{}'", element.name, attribute),
                ));
            }
        }

        let mut counts: HashMap<&str, u32> = HashMap::new();
        let mut furthest = 0usize;
        for child in &element.children {
            let Some((index, declared)) = rule.child(&child.name) else {
                if !rule.open {
                    violations.push(SchemaViolation::at(
                        ViolationKind::UnexpectedElement,
                        child,
                        format!("<{}> is not allowed inside <{}>", child.name, element.name),
                    ));
                }
                continue;
            };

            let count = counts.entry(declared.name.as_str()).or_insert(0);
            *count += 1;
            if let Some(max) = declared.max {
                if *count == max + 1 {
                    violations.push(SchemaViolation::at(
                        ViolationKind::TooManyOccurrences,
                        child,
                        format!(
                            "<{}> may occur at most {} time(s) inside <{}>",
                            child.name, max, element.name
                        ),
                    ));
                }
            }

            if rule.ordered && index < furthest {
                violations.push(SchemaViolation::at(
                    ViolationKind::OutOfOrder,
                    child,
                    format!(
                        "<{}> appears after <{}> but must precede it",
                        child.name, rule.children[furthest].name
                    ),
                ));
            }
            furthest = furthest.max(index);
        }

        for declared in rule.children.iter().filter(|c| c.is_required()) {
            let found = counts.get(declared.name.as_str()).copied().unwrap_or(0);
            if found < declared.min {
                let message = if found == 0 {
                    format!("<{}> is missing required element <{}>", element.name, declared.name)
                } else {
                    format!(
                        "<{}> needs at least {} <{}> element(s), found {}",
                        element.name, declared.min, declared.name, found
                    )
                };
                violations.push(SchemaViolation::at(ViolationKind::MissingElement, element, message));
            }
        }

        if let Some(value) = rule.value {
            if !value.accepts(&element.text) {
                violations.push(SchemaViolation::at(
                    ViolationKind::InvalidValue,
                    element,
                    format!(
                        "<{}> value '{}' is not {}",
                        element.name,
                        element.text,
                        value.describe()
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> StructuralSchema {
        serde_yaml::from_str(
            r#"
version: "1.0"
namespace: "urn:test"
roots: [Message]
elements:
  Message:
    required_attributes: [Version]
    ordered: true
    children:
      - { name: Header, min: 1, max: 1 }
      - { name: Body, min: 1 }
  Header:
    open: true
    children:
      - { name: Id, min: 1, max: 1 }
  Id:
    value: non_empty_string
  Count:
    value: integer
"#,
        )
        .unwrap()
    }

    fn check(xml: &str) -> Vec<SchemaViolation> {
        let doc = XmlDocument::parse(xml).unwrap();
        schema().check(&doc).unwrap()
    }

    #[test]
    fn test_conforming_document() {
        let violations = check(
            r#"<Message xmlns="urn:test" Version="1"><Header><Id>x</Id><Extra/></Header><Body/></Message>"#,
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_wrong_root_stops_checking() {
        let violations = check(r#"<Other xmlns="urn:test"/>"#);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::UnexpectedRoot);
    }

    #[test]
    fn test_namespace_mismatch() {
        let violations = check(r#"<Message xmlns="urn:other" Version="1"><Header><Id>x</Id></Header><Body/></Message>"#);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::NamespaceMismatch);
    }

    #[test]
    fn test_missing_and_unexpected_elements() {
        let violations = check(r#"<Message xmlns="urn:test" Version="1"><Header/><Stray/></Message>"#);
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::UnexpectedElement,
                ViolationKind::MissingElement,
                ViolationKind::MissingElement,
            ]
        );
        assert_eq!(violations[0].path, "/Message/Stray");
        assert_eq!(violations[1].path, "/Message");
        assert!(violations[1].message.contains("<Body>"));
        assert_eq!(violations[2].path, "/Message/Header");
    }

    #[test]
    fn test_occurrence_order_attribute_and_value() {
        let violations = check(
            r#"<Message xmlns="urn:test"><Body/><Header><Id> </Id></Header><Header><Id>y</Id></Header></Message>"#,
        );
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::MissingAttribute,
                ViolationKind::OutOfOrder,
                ViolationKind::TooManyOccurrences,
                ViolationKind::OutOfOrder,
                ViolationKind::InvalidValue,
            ]
        );
        assert_eq!(violations[2].path, "/Message/Header[2]");
        assert_eq!(violations[4].path, "/Message/Header[1]/Id");
    }
}
