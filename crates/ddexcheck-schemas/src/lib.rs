//! DDEXCheck Schemas - document tree, structural schemas and the schema registry
//!
//! This crate provides the collaborators the validation core builds on:
//! - **Document tree**: a navigable XML tree with element paths and source positions
//! - **Structural schemas**: declarative YAML/JSON descriptions of a DDEX message
//!   version and a conformance checker that enforces them
//! - **Schema Registry**: explicit load/unload ownership of schemas, shared
//!   read-only once populated
//! - **Version detection**: ERN version and message metadata from a document root
//!
//! ## Quick Start
//!
//! ```rust
//! use ddexcheck_schemas::{ConformanceChecker, MessageInfo, SchemaRegistry, XmlDocument};
//!
//! let registry = SchemaRegistry::with_builtin().unwrap();
//! let document = XmlDocument::parse(
//!     r#"<NewReleaseMessage MessageSchemaVersionId="ern/382"/>"#,
//! ).unwrap();
//!
//! let info = MessageInfo::from_document(&document);
//! let schema = registry.get(info.schema_version.as_deref().unwrap()).unwrap();
//! let violations = schema.checker().check(&document).unwrap();
//! assert!(!violations.is_empty());
//! ```
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod registry;
pub mod structure;
pub mod tree;
pub mod version;

// Re-export commonly used types for convenience
pub use loader::{LoaderError, LoaderResult, SchemaLoader};
pub use registry::{SchemaDescriptor, SchemaRegistry, SchemaSource};
pub use structure::{CheckerError, ConformanceChecker, SchemaViolation, StructuralSchema, ViolationKind};
pub use tree::{Position, TreeError, XmlDocument, XmlElement};
pub use version::{normalize_version, MessageInfo};
