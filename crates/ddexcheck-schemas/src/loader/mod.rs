//! Schema loading: format detection, meta-schema checking and built-in resources
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;
pub mod schema_loader;

pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, SchemaParser};
pub use schema_loader::{builtin_content, builtin_for_version, SchemaLoader, BUILTIN_SCHEMAS, DEFAULT_RESOURCE};
