//! Export types for serializing knowledge-base state.
//!
//! These types provide human-readable, name-resolved representations of
//! resources and facts suitable for JSON export.

use serde::{Deserialize, Serialize};

/// Exported resource with its insertion position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExport {
    /// Position in the database's insertion order.
    pub index: usize,
    /// Resource name.
    pub name: String,
}

/// Exported fact with names resolved for every position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactExport {
    /// Index of the predicate resource.
    pub predicate_index: usize,
    /// Predicate name.
    pub predicate: String,
    /// Argument names, in order.
    pub arguments: Vec<String>,
}

/// Snapshot of a whole database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeExport {
    /// Database identifier.
    pub database: u64,
    pub resources: Vec<ResourceExport>,
    pub facts: Vec<FactExport>,
}
