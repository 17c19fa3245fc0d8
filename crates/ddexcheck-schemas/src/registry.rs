//! Schema Registry: explicit ownership of loaded schemas
//!
//! A registry is populated once (`load`, `register`, `with_builtin`) and then
//! shared read-only, typically behind an `Arc`, by every validation that needs
//! a schema. `unload` and `clear` are the teardown half of the lifecycle.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::{LoaderResult, SchemaLoader, BUILTIN_SCHEMAS};
use crate::structure::ConformanceChecker;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

const BUILTIN_PREFIX: &str = "builtin:";

/// Where a schema comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SchemaSource {
    /// A schema file on disk
    Path(PathBuf),
    /// An embedded resource id such as `ern-382`
    Resource(String),
}

impl FromStr for SchemaSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.strip_prefix(BUILTIN_PREFIX) {
            Some(id) => SchemaSource::Resource(id.to_string()),
            None => SchemaSource::Path(PathBuf::from(s)),
        })
    }
}

impl From<String> for SchemaSource {
    fn from(value: String) -> Self {
        match value.strip_prefix(BUILTIN_PREFIX) {
            Some(id) => SchemaSource::Resource(id.to_string()),
            None => SchemaSource::Path(PathBuf::from(value)),
        }
    }
}

impl From<SchemaSource> for String {
    fn from(source: SchemaSource) -> Self {
        source.to_string()
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Path(path) => write!(f, "{}", path.display()),
            SchemaSource::Resource(id) => write!(f, "{BUILTIN_PREFIX}{id}"),
        }
    }
}

/// A loaded schema: version, origin and the checker that enforces it
#[derive(Clone)]
pub struct SchemaDescriptor {
    pub version: String,
    pub source: SchemaSource,
    checker: Arc<dyn ConformanceChecker>,
}

impl SchemaDescriptor {
    pub fn checker(&self) -> &Arc<dyn ConformanceChecker> {
        &self.checker
    }
}

impl fmt::Debug for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("version", &self.version)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Version-keyed collection of loaded schemas
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    descriptors: BTreeMap<String, SchemaDescriptor>,
    loader: SchemaLoader,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in schema
    pub fn with_builtin() -> LoaderResult<Self> {
        let mut registry = Self::new();
        for (id, _) in BUILTIN_SCHEMAS {
            registry.load(&SchemaSource::Resource(id.to_string()))?;
        }
        Ok(registry)
    }

    /// Load a schema and register it under its declared version
    ///
    /// A schema already registered for the same version is replaced.
    pub fn load(&mut self, source: &SchemaSource) -> LoaderResult<&SchemaDescriptor> {
        let schema = self.loader.load(source)?;
        let version = schema.version.clone();
        info!(version = %version, source = %source, "Schema loaded");
        Ok(self.insert(version, source.clone(), Arc::new(schema)))
    }

    /// Register an externally built checker
    pub fn register(
        &mut self,
        version: impl Into<String>,
        source: SchemaSource,
        checker: Arc<dyn ConformanceChecker>,
    ) -> &SchemaDescriptor {
        self.insert(version.into(), source, checker)
    }

    fn insert(
        &mut self,
        version: String,
        source: SchemaSource,
        checker: Arc<dyn ConformanceChecker>,
    ) -> &SchemaDescriptor {
        let descriptor = SchemaDescriptor {
            version: version.clone(),
            source,
            checker,
        };
        match self.descriptors.entry(version) {
            Entry::Occupied(mut slot) => {
                warn!(version = %slot.key(), "Replacing previously registered schema");
                slot.insert(descriptor);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(descriptor),
        }
    }

    /// Schema registered for a version
    pub fn get(&self, version: &str) -> Option<&SchemaDescriptor> {
        self.descriptors.get(version)
    }

    /// Schema that was loaded from a given source
    pub fn find_by_source(&self, source: &SchemaSource) -> Option<&SchemaDescriptor> {
        self.descriptors.values().find(|d| &d.source == source)
    }

    /// Registered versions in ascending order
    pub fn versions(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.descriptors.values()
    }

    /// Drop the schema for a version; true if one was registered
    pub fn unload(&mut self, version: &str) -> bool {
        let removed = self.descriptors.remove(version).is_some();
        if removed {
            info!(version, "Schema unloaded");
        }
        removed
    }

    /// Drop every registered schema
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
