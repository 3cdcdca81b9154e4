//! Identity types for the knowledge base.
//!
//! A [`Resource`] is a named individual constant. Once added to a
//! [`Database`](super::Database) it is referred to by a [`ResourceId`]:
//! two resources with the same name are still distinct handles.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_DATABASE: AtomicU64 = AtomicU64::new(1);

/// Process-unique, niche-optimized identifier of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DatabaseId(NonZeroU64);

impl DatabaseId {
    /// Allocate the next identifier.
    pub(crate) fn fresh() -> Self {
        let raw = NEXT_DATABASE.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "db:{}", self.0)
    }
}

/// Stable handle of a resource inside one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    database: DatabaseId,
    index: usize,
}

impl ResourceId {
    pub(crate) fn new(database: DatabaseId, index: usize) -> Self {
        Self { database, index }
    }

    pub fn database(self) -> DatabaseId {
        self.database
    }

    /// Position of the resource in its database's insertion order.
    pub fn index(self) -> usize {
        self.index
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "res:{}/{}", self.database.0, self.index)
    }
}

/// A named individual constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    name: String,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A predicate applied to an ordered list of arguments.
///
/// Facts hold handles only; the resources stay owned by the database that
/// created the fact. Build one with [`Database::create_fact`](super::Database::create_fact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    origin: DatabaseId,
    predicate: ResourceId,
    arguments: Vec<ResourceId>,
}

impl Fact {
    pub(crate) fn new(origin: DatabaseId, predicate: ResourceId) -> Self {
        Self {
            origin,
            predicate,
            arguments: Vec::new(),
        }
    }

    pub(crate) fn push_argument(&mut self, argument: ResourceId) {
        self.arguments.push(argument);
    }

    /// Database that created this fact.
    pub fn origin(&self) -> DatabaseId {
        self.origin
    }

    pub fn predicate(&self) -> ResourceId {
        self.predicate
    }

    pub fn arguments(&self) -> &[ResourceId] {
        &self.arguments
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Same predicate and the same arguments in the same order.
    pub fn matches(&self, other: &Fact) -> bool {
        self.predicate == other.predicate && self.arguments == other.arguments
    }
}
