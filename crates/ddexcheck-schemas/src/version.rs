//! ERN version detection and message metadata
//!
//! DDEX carries its schema version in two places: the namespace URI
//! (`http://ddex.net/xml/ern/382`) and the `MessageSchemaVersionId` attribute
//! (`ern/382`). Both encode the version as a run of digits, one per component.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::tree::XmlDocument;
use serde::{Deserialize, Serialize};

const ERN_NAMESPACE_MARKER: &str = "ddex.net/xml/ern/";

/// Turn a compact ERN version token (`382`, `ern/41`, `3.8.2`) into dotted form
///
/// Returns `None` when the token carries no digits.
pub fn normalize_version(token: &str) -> Option<String> {
    let token = token.trim();
    let token = token.rsplit('/').next().unwrap_or(token);

    if token.contains('.') {
        let valid = token
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        return valid.then(|| token.to_string());
    }

    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let parts: Vec<String> = token.chars().map(String::from).collect();
    Some(parts.join("."))
}

/// Version encoded in an ERN namespace URI
pub fn version_from_namespace(namespace: &str) -> Option<String> {
    let index = namespace.find(ERN_NAMESPACE_MARKER)?;
    let rest = &namespace[index + ERN_NAMESPACE_MARKER.len()..];
    let token = rest.split('/').next().unwrap_or(rest);
    normalize_version(token)
}

/// Descriptive metadata read from a message root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub message_type: String,
    pub schema_version: Option<String>,
    pub namespace: Option<String>,
    pub message_schema_version_id: Option<String>,
    pub business_profile_version_id: Option<String>,
    pub release_profile_version_id: Option<String>,
    pub language_and_script_code: Option<String>,
}

impl MessageInfo {
    /// Read message metadata from the root element
    ///
    /// The namespace wins over `MessageSchemaVersionId` when both carry a version.
    pub fn from_document(document: &XmlDocument) -> Self {
        let root = document.root();
        let namespace = root.namespace().map(str::to_string);
        let attr = |name: &str| root.attribute(name).map(str::to_string);
        let message_schema_version_id = attr("MessageSchemaVersionId");

        let schema_version = namespace
            .as_deref()
            .and_then(version_from_namespace)
            .or_else(|| message_schema_version_id.as_deref().and_then(normalize_version));

        Self {
            message_type: root.name.clone(),
            schema_version,
            namespace,
            message_schema_version_id,
            business_profile_version_id: attr("BusinessProfileVersionId"),
            release_profile_version_id: attr("ReleaseProfileVersionId"),
            language_and_script_code: attr("LanguageAndScriptCode"),
        }
    }
}
