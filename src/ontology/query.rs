//! Fact membership checks and triple-pattern queries.

use std::slice;

use super::{Database, Fact, ResourceId};
use crate::error::{OntologyError, OntologyResult};

/// Which end of a binary fact a triple query is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Subject(ResourceId),
    Object(ResourceId),
}

impl Database {
    /// Whether a stored fact has the same predicate and the same arguments
    /// in the same order as `fact`.
    pub fn check_fact(&self, fact: &Fact) -> bool {
        self.facts().iter().any(|stored| stored.matches(fact))
    }

    /// Project a binary relation.
    ///
    /// Exactly one of `subject` and `object` must be given. With a subject,
    /// yields the second argument of every `relation(subject, _)` fact; with
    /// an object, yields the first argument of every `relation(_, object)`
    /// fact. Results follow fact insertion order.
    pub fn query_triple(
        &self,
        relation: ResourceId,
        subject: Option<ResourceId>,
        object: Option<ResourceId>,
    ) -> OntologyResult<TripleMatches<'_>> {
        let anchor = match (subject, object) {
            (Some(s), None) => Anchor::Subject(s),
            (None, Some(o)) => Anchor::Object(o),
            (Some(_), Some(_)) => {
                return Err(OntologyError::InvalidQuery {
                    reason: "both subject and object are fixed".into(),
                });
            }
            (None, None) => {
                return Err(OntologyError::InvalidQuery {
                    reason: "neither subject nor object is fixed".into(),
                });
            }
        };
        Ok(TripleMatches {
            db: self,
            facts: self.facts().iter(),
            relation,
            anchor,
        })
    }
}

/// Lazy iterator over the results of [`Database::query_triple`].
pub struct TripleMatches<'a> {
    db: &'a Database,
    facts: slice::Iter<'a, Fact>,
    relation: ResourceId,
    anchor: Anchor,
}

impl Iterator for TripleMatches<'_> {
    type Item = ResourceId;

    fn next(&mut self) -> Option<ResourceId> {
        for fact in self.facts.by_ref() {
            if fact.predicate() != self.relation {
                continue;
            }
            let [first, second, ..] = fact.arguments() else {
                let err = OntologyError::MalformedFact {
                    predicate: self.db.name_of(fact.predicate()).unwrap_or("?").to_string(),
                    arity: fact.arity(),
                };
                tracing::warn!(error = %err, "skipping fact in triple query");
                continue;
            };
            match self.anchor {
                Anchor::Subject(s) if *first == s => return Some(*second),
                Anchor::Object(o) if *second == o => return Some(*first),
                _ => {}
            }
        }
        None
    }
}
