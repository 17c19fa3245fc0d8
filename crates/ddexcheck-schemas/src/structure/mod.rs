//! Structural schemas: the declarative model and the conformance checker
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

pub mod checker;
pub mod model;

pub use checker::{CheckerError, ConformanceChecker, SchemaViolation, ViolationKind};
pub use model::{ChildRule, ElementRule, StructuralSchema, ValueType};
