//! Diagnostics: the shared shape of every finding
//!
//! Schema violations and business-rule findings are both reported as a
//! [`Diagnostic`] carrying a [`Severity`], a [`Code`] from the closed catalog,
//! a tree path and optional remediation hints.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use ddexcheck_schemas::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Warning, should be reviewed
    Warning,
    /// Error, the document is invalid
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The closed catalog of diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    InvalidIsrc,
    InvalidGrid,
    InvalidIsan,
    InvalidVisan,
    InvalidIcpn,
    DuplicateIdentifier,
    DanglingReference,
    IncompleteDeal,
    MissingDuration,
    InvalidDuration,
    InvalidDate,
    InvalidRegionCode,
    InvalidLanguageCode,
    SchemaViolation,
    FatalParseError,
    FatalConfigError,
}

impl Code {
    pub const ALL: [Code; 16] = [
        Code::InvalidIsrc,
        Code::InvalidGrid,
        Code::InvalidIsan,
        Code::InvalidVisan,
        Code::InvalidIcpn,
        Code::DuplicateIdentifier,
        Code::DanglingReference,
        Code::IncompleteDeal,
        Code::MissingDuration,
        Code::InvalidDuration,
        Code::InvalidDate,
        Code::InvalidRegionCode,
        Code::InvalidLanguageCode,
        Code::SchemaViolation,
        Code::FatalParseError,
        Code::FatalConfigError,
    ];

    /// Stable catalog string
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::InvalidIsrc => "INVALID_ISRC",
            Code::InvalidGrid => "INVALID_GRID",
            Code::InvalidIsan => "INVALID_ISAN",
            Code::InvalidVisan => "INVALID_VISAN",
            Code::InvalidIcpn => "INVALID_ICPN",
            Code::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            Code::DanglingReference => "DANGLING_REFERENCE",
            Code::IncompleteDeal => "INCOMPLETE_DEAL",
            Code::MissingDuration => "MISSING_DURATION",
            Code::InvalidDuration => "INVALID_DURATION",
            Code::InvalidDate => "INVALID_DATE",
            Code::InvalidRegionCode => "INVALID_REGION_CODE",
            Code::InvalidLanguageCode => "INVALID_LANGUAGE_CODE",
            Code::SchemaViolation => "SCHEMA_VIOLATION",
            Code::FatalParseError => "FATAL_PARSE_ERROR",
            Code::FatalConfigError => "FATAL_CONFIG_ERROR",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Code::FatalParseError | Code::FatalConfigError)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown diagnostic code string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagnostic code '{0}'")]
pub struct UnknownCode(pub String);

impl FromStr for Code {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Code::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCode(s.to_string()))
    }
}

/// One reported finding
///
/// Fields are fixed once the builder chain ends; a severity change yields a
/// new value through [`Diagnostic::escalated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    severity: Severity,
    code: Code,
    message: String,
    /// Slash-delimited tree path of the offending element
    element_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: Code, message: impl Into<String>, element_path: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            element_path: element_path.into(),
            context: None,
            suggestion: None,
            line: None,
            column: None,
        }
    }

    pub fn error(code: Code, message: impl Into<String>, element_path: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message, element_path)
    }

    pub fn warning(code: Code, message: impl Into<String>, element_path: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message, element_path)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.line = Some(position.line);
        self.column = Some(position.column);
        self
    }

    /// Source position when only part of it may be known
    pub fn located(mut self, line: Option<usize>, column: Option<usize>) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// The same finding reported as an error
    pub fn escalated(self) -> Self {
        Self {
            severity: Severity::Error,
            ..self
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn element_path(&self) -> &str {
        &self.element_path
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `line:column`, when the diagnostic carries a source position
    pub fn location(&self) -> Option<String> {
        match (self.line, self.column) {
            (Some(line), Some(column)) => Some(format!("{line}:{column}")),
            (Some(line), None) => Some(line.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {} ({})", self.severity, self.code, self.message, self.element_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_round_trip() {
        for code in Code::ALL {
            assert_eq!(code.as_str().parse::<Code>().unwrap(), code);
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
        assert!("INVALID_TERRITORY".parse::<Code>().is_err());
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
        assert_eq!(Severity::Error.to_string(), "error");
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn test_diagnostic_builder() {
        let diagnostic = Diagnostic::error(Code::InvalidIsrc, "bad ISRC", "/M/ISRC")
            .with_context("XX")
            .with_suggestion("CCXXXYYNNNNN")
            .at(Position { line: 3, column: 7 });

        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.location().as_deref(), Some("3:7"));

        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["code"], "INVALID_ISRC");
        assert_eq!(json["severity"], "ERROR");
        assert_eq!(json["context"], "XX");
    }

    #[test]
    fn test_escalated_keeps_everything_but_severity() {
        let warning = Diagnostic::warning(Code::MissingDuration, "no duration", "/M/SoundRecording")
            .with_suggestion("Add a Duration")
            .located(Some(4), None);
        let error = warning.clone().escalated();

        assert_eq!(warning.severity(), Severity::Warning);
        assert_eq!(error.severity(), Severity::Error);
        assert_eq!(error.code(), warning.code());
        assert_eq!(error.suggestion(), Some("Add a Duration"));
        assert_eq!(error.location().as_deref(), Some("4"));
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let diagnostic = Diagnostic::warning(Code::MissingDuration, "no duration", "/M/SoundRecording");
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert!(json.get("context").is_none());
        assert!(json.get("line").is_none());
        assert_eq!(diagnostic.location(), None);
    }
}
