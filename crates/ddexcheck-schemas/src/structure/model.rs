//! Declarative structural schema model
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structural description of one message schema version
///
/// Elements are keyed by local name. An element without an entry is not
/// checked beyond whether its parent admits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSchema {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message types accepted as the document root
    pub roots: Vec<String>,
    #[serde(default)]
    pub elements: BTreeMap<String, ElementRule>,
}

/// Content model for one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementRule {
    pub required_attributes: Vec<String>,
    pub children: Vec<ChildRule>,
    /// Children must follow declaration order
    pub ordered: bool,
    /// Undeclared children are allowed
    pub open: bool,
    pub value: Option<ValueType>,
}

impl ElementRule {
    /// Declaration index and rule for a child name
    pub fn child(&self, name: &str) -> Option<(usize, &ChildRule)> {
        self.children
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }
}

/// Occurrence constraint for a child element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRule {
    pub name: String,
    #[serde(default)]
    pub min: u32,
    /// `None` means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl ChildRule {
    pub fn is_required(&self) -> bool {
        self.min > 0
    }
}

/// Simple content types for leaf elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    NonEmptyString,
    Integer,
    Decimal,
    Boolean,
}

impl ValueType {
    /// Whether the trimmed text is a lexically valid value of this type
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            ValueType::String => true,
            ValueType::NonEmptyString => !text.trim().is_empty(),
            ValueType::Integer => {
                let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
                !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
            }
            ValueType::Decimal => {
                let body = text.strip_prefix(['-', '+']).unwrap_or(text);
                let mut parts = body.splitn(2, '.');
                let whole = parts.next().unwrap_or("");
                let fraction = parts.next();
                let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
                match fraction {
                    Some(f) => (!whole.is_empty() || !f.is_empty()) && digits(whole) && digits(f),
                    None => !whole.is_empty() && digits(whole),
                }
            }
            ValueType::Boolean => matches!(text, "true" | "false" | "1" | "0"),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ValueType::String => "text",
            ValueType::NonEmptyString => "non-empty text",
            ValueType::Integer => "an integer",
            ValueType::Decimal => "a decimal number",
            ValueType::Boolean => "a boolean (true/false)",
        }
    }
}
