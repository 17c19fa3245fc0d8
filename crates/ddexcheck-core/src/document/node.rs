//! Tagged document nodes
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::identifiers::IdentifierKind;
use ddexcheck_schemas::Position;
use serde::Serialize;
use std::fmt;

/// Resource types that can be the target of a resource reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    SoundRecording,
    Video,
    Image,
    Text,
    SheetMusic,
    Software,
    Midi,
    UserDefinedResource,
    /// Any other `ResourceList` entry that declares a resource reference
    Other,
}

impl ResourceKind {
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "SoundRecording" => Some(ResourceKind::SoundRecording),
            "Video" => Some(ResourceKind::Video),
            "Image" => Some(ResourceKind::Image),
            "Text" => Some(ResourceKind::Text),
            "SheetMusic" => Some(ResourceKind::SheetMusic),
            "Software" => Some(ResourceKind::Software),
            "MIDI" => Some(ResourceKind::Midi),
            "UserDefinedResource" => Some(ResourceKind::UserDefinedResource),
            _ => None,
        }
    }

    /// Whether this resource is expected to carry a playing time
    pub fn is_timed(&self) -> bool {
        matches!(self, ResourceKind::SoundRecording | ResourceKind::Video)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a reference element points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceTarget {
    Resource,
    Release,
}

impl ReferenceTarget {
    /// Target of a reference element with this local name
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "ReleaseResourceReference" | "LinkedReleaseResourceReference" | "DealResourceReference" => {
                Some(ReferenceTarget::Resource)
            }
            "DealReleaseReference" => Some(ReferenceTarget::Release),
            _ => None,
        }
    }

    /// Name of the element that declares targets of this kind
    pub fn anchor_name(&self) -> &'static str {
        match self {
            ReferenceTarget::Resource => "ResourceReference",
            ReferenceTarget::Release => "ReleaseReference",
        }
    }
}

/// Date fields and the form they must take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DateKind {
    /// `YYYY-MM-DD`
    Date,
    /// ISO-8601 date-time
    DateTime,
}

impl DateKind {
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "ReleaseDate" | "OriginalReleaseDate" | "CreationDate" | "StartDate" | "EndDate" => Some(DateKind::Date),
            "MessageCreatedDateTime" | "StartDateTime" | "EndDateTime" => Some(DateKind::DateTime),
            _ => None,
        }
    }
}

/// Which commercial terms a deal carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DealTerms {
    /// A deal resource reference, or a release reference on the enclosing release deal
    pub references_content: bool,
    pub has_territory: bool,
    pub has_start_date: bool,
    /// A use type or commercial model type
    pub has_usage: bool,
}

/// The element variants rules match on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Identifier(IdentifierKind),
    Resource {
        kind: ResourceKind,
        reference: Option<String>,
        has_duration: bool,
    },
    Release {
        reference: Option<String>,
    },
    Deal(DealTerms),
    Reference(ReferenceTarget),
    Date(DateKind),
    Duration,
    Territory,
    Language,
}

/// One classified element with its locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Trimmed text content, empty for container nodes
    pub value: String,
    pub path: String,
    pub position: Position,
}
