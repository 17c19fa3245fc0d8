//! Identifier format validators
//!
//! Pure, total functions: every input gets a [`Verdict`], nothing here fails
//! or performs I/O.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::diagnostic::Code;
use serde::{Deserialize, Serialize};
use std::fmt;

const MOD_37_36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Identifier kinds carried by DDEX messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    Isrc,
    Grid,
    Isan,
    Visan,
    Icpn,
}

impl IdentifierKind {
    pub const ALL: [IdentifierKind; 5] = [
        IdentifierKind::Isrc,
        IdentifierKind::Grid,
        IdentifierKind::Isan,
        IdentifierKind::Visan,
        IdentifierKind::Icpn,
    ];

    /// Kind carried by an element with this local name
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "ISRC" => Some(IdentifierKind::Isrc),
            "GRid" => Some(IdentifierKind::Grid),
            "ISAN" => Some(IdentifierKind::Isan),
            "VISAN" => Some(IdentifierKind::Visan),
            "ICPN" => Some(IdentifierKind::Icpn),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdentifierKind::Isrc => "ISRC",
            IdentifierKind::Grid => "GRid",
            IdentifierKind::Isan => "ISAN",
            IdentifierKind::Visan => "V-ISAN",
            IdentifierKind::Icpn => "ICPN",
        }
    }

    /// Diagnostic code for a malformed value of this kind
    pub fn code(&self) -> Code {
        match self {
            IdentifierKind::Isrc => Code::InvalidIsrc,
            IdentifierKind::Grid => Code::InvalidGrid,
            IdentifierKind::Isan => Code::InvalidIsan,
            IdentifierKind::Visan => Code::InvalidVisan,
            IdentifierKind::Icpn => Code::InvalidIcpn,
        }
    }

    /// Human description of the expected format
    pub fn expected_pattern(&self) -> &'static str {
        match self {
            IdentifierKind::Isrc => {
                "12 characters: 2-letter country code, 3 alphanumeric registrant characters, 7 digits (e.g. USRC17607839)"
            }
            IdentifierKind::Grid => "A1 followed by 16 alphanumeric characters (e.g. A12425GABC1234002M)",
            IdentifierKind::Isan => "12 hexadecimal characters (e.g. 00000000A5C0)",
            IdentifierKind::Visan => "24 hexadecimal characters",
            IdentifierKind::Icpn => "12 (UPC) or 13 (EAN) digits with a valid check digit (e.g. 012345678905)",
        }
    }

    /// Run the validator for this kind
    pub fn validate(&self, value: &str, strict: bool) -> Verdict {
        match self {
            IdentifierKind::Isrc => validate_isrc(value),
            IdentifierKind::Grid => validate_grid(value, strict),
            IdentifierKind::Isan => validate_isan(value),
            IdentifierKind::Visan => validate_visan(value),
            IdentifierKind::Icpn => validate_icpn(value),
        }
    }

    /// Canonical form used for comparison and reporting
    pub fn normalize(&self, value: &str) -> String {
        let value = value.trim();
        match self {
            IdentifierKind::Isrc | IdentifierKind::Icpn => value.to_ascii_uppercase(),
            IdentifierKind::Grid | IdentifierKind::Isan | IdentifierKind::Visan => value
                .chars()
                .filter(|c| *c != '-')
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a format check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Valid,
    InvalidFormat(String),
}

impl Verdict {
    fn invalid(reason: impl Into<String>) -> Self {
        Verdict::InvalidFormat(reason.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// The violated format rule, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::InvalidFormat(reason) => Some(reason),
        }
    }
}

/// An identifier as found in a document, with its verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierValue {
    pub kind: IdentifierKind,
    pub raw: String,
    pub normalized: String,
    pub verdict: Verdict,
}

impl IdentifierValue {
    pub fn new(kind: IdentifierKind, raw: impl Into<String>, strict: bool) -> Self {
        let raw = raw.into();
        Self {
            kind,
            normalized: kind.normalize(&raw),
            verdict: kind.validate(&raw, strict),
            raw,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }
}

/// ISRC: `CC` country + `XXX` registrant + 7 digits (year and designation)
///
/// The total length of 12 is authoritative; the split of the 7-digit tail into
/// year and designation is not checked.
pub fn validate_isrc(value: &str) -> Verdict {
    let value = value.trim().to_ascii_uppercase();
    if value.is_empty() {
        return Verdict::invalid("value is empty");
    }
    if !value.is_ascii() {
        return Verdict::invalid("contains non-ASCII characters");
    }
    if value.len() != 12 {
        return Verdict::invalid(format!("must be 12 characters, found {}", value.len()));
    }

    let (country, rest) = value.split_at(2);
    let (registrant, tail) = rest.split_at(3);
    if !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Verdict::invalid(format!("country code '{country}' must be two letters"));
    }
    if !registrant.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Verdict::invalid(format!("registrant code '{registrant}' must be alphanumeric"));
    }
    if !tail.chars().all(|c| c.is_ascii_digit()) {
        return Verdict::invalid(format!("year and designation '{tail}' must be 7 digits"));
    }
    Verdict::Valid
}

/// GRid: `A1` + 16 alphanumerics; the check character is verified in strict mode
pub fn validate_grid(value: &str, strict: bool) -> Verdict {
    let value = IdentifierKind::Grid.normalize(value);
    if value.is_empty() {
        return Verdict::invalid("value is empty");
    }
    if !value.starts_with("A1") {
        return Verdict::invalid("must start with 'A1'");
    }
    if value.len() != 18 {
        return Verdict::invalid(format!("must be 18 characters, found {}", value.chars().count()));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Verdict::invalid("must contain only letters and digits");
    }

    if strict {
        let (body, check) = value.split_at(17);
        match grid_check_character(body) {
            Some(expected) if check.starts_with(expected) => {}
            Some(expected) => {
                return Verdict::invalid(format!("check character '{check}' does not match computed '{expected}'"));
            }
            None => return Verdict::invalid("cannot compute check character"),
        }
    }
    Verdict::Valid
}

/// ISAN: 12 hexadecimal characters, hyphens ignored
pub fn validate_isan(value: &str) -> Verdict {
    validate_hex(&IdentifierKind::Isan.normalize(value), 12)
}

/// V-ISAN: 24 hexadecimal characters, hyphens ignored
pub fn validate_visan(value: &str) -> Verdict {
    validate_hex(&IdentifierKind::Visan.normalize(value), 24)
}

fn validate_hex(value: &str, length: usize) -> Verdict {
    if value.is_empty() {
        return Verdict::invalid("value is empty");
    }
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Verdict::invalid("must contain only hexadecimal characters");
    }
    if value.len() != length {
        return Verdict::invalid(format!("must be {length} hexadecimal characters, found {}", value.len()));
    }
    Verdict::Valid
}

/// ICPN: UPC-A (12 digits) or EAN-13 (13 digits), GTIN mod-10 check digit
pub fn validate_icpn(value: &str) -> Verdict {
    let value = value.trim();
    if value.is_empty() {
        return Verdict::invalid("value is empty");
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Verdict::invalid("must contain only digits");
    }
    if value.len() != 12 && value.len() != 13 {
        return Verdict::invalid(format!("must be 12 or 13 digits, found {}", value.len()));
    }

    let (body, check) = value.split_at(value.len() - 1);
    let expected = gtin_check_digit(body);
    if check.bytes().next().map(|b| b - b'0') != Some(expected) {
        return Verdict::invalid(format!("check digit {check} does not match computed {expected}"));
    }
    Verdict::Valid
}

/// GTIN mod-10 check digit over an all-digit body
///
/// Weights alternate 3 and 1 starting from the rightmost body digit.
pub fn gtin_check_digit(body: &str) -> u8 {
    let sum: u32 = body
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b.saturating_sub(b'0'));
            if i % 2 == 0 {
                digit * 3
            } else {
                digit
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// ISO/IEC 7064 MOD 37-36 check character
pub fn grid_check_character(body: &str) -> Option<char> {
    let mut product = 36u32;
    for c in body.chars() {
        let value = c.to_digit(36)?;
        let mut sum = (product + value) % 36;
        if sum == 0 {
            sum = 36;
        }
        product = (sum * 2) % 37;
    }
    let index = ((37 - product) % 36) as usize;
    MOD_37_36_ALPHABET.get(index).map(|b| *b as char)
}
