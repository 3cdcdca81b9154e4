//! In-memory knowledge base of resources and facts.
//!
//! A [`Database`] owns an insertion-ordered list of [`Resource`]s and an
//! insertion-ordered list of [`Fact`]s over them. Every resource a stored
//! fact references belongs to the same database; this is checked when a fact
//! is created, when an argument is appended and when the fact is stored.
//! Violations are reported and the offending call is skipped, leaving the
//! database valid.

pub mod query;
pub mod resource;

pub use query::TripleMatches;
pub use resource::{DatabaseId, Fact, Resource, ResourceId};

use crate::error::{OntologyError, OntologyResult};
use crate::export::{FactExport, KnowledgeExport, ResourceExport};

/// Owning container of resources and facts.
#[derive(Debug)]
pub struct Database {
    id: DatabaseId,
    resources: Vec<Resource>,
    facts: Vec<Fact>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Create an empty database with a fresh identity.
    pub fn new() -> Self {
        let id = DatabaseId::fresh();
        tracing::debug!(database = %id, "created database");
        Self {
            id,
            resources: Vec::new(),
            facts: Vec::new(),
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.id
    }

    /// Whether `id` names a resource stored in this database.
    pub fn contains(&self, id: ResourceId) -> bool {
        id.database() == self.id && id.index() < self.resources.len()
    }

    fn unknown(&self, id: ResourceId) -> OntologyError {
        OntologyError::UnknownResource {
            resource: id.to_string(),
            database: self.id.get(),
        }
    }

    /// Append a resource and return its handle. Names are not deduplicated.
    pub fn add_resource(&mut self, resource: Resource) -> ResourceId {
        let id = ResourceId::new(self.id, self.resources.len());
        tracing::debug!(resource = %id, name = resource.name(), "added resource");
        self.resources.push(resource);
        id
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        if id.database() != self.id {
            return None;
        }
        self.resources.get(id.index())
    }

    pub fn name_of(&self, id: ResourceId) -> Option<&str> {
        self.resource(id).map(Resource::name)
    }

    /// First resource with `name` in insertion order.
    ///
    /// The empty name never matches.
    pub fn find_resource(&self, name: &str) -> Option<ResourceId> {
        if name.is_empty() {
            return None;
        }
        self.resources
            .iter()
            .position(|r| r.name() == name)
            .map(|index| ResourceId::new(self.id, index))
    }

    /// Start a fact over `predicate` with no arguments. The fact is not stored.
    pub fn create_fact(&self, predicate: ResourceId) -> OntologyResult<Fact> {
        if !self.contains(predicate) {
            let err = self.unknown(predicate);
            tracing::warn!(error = %err, "rejected fact predicate");
            return Err(err);
        }
        Ok(Fact::new(self.id, predicate))
    }

    /// Append an argument to a fact under construction.
    ///
    /// An argument from outside this database is rejected and the fact is
    /// left unchanged.
    pub fn add_argument_to_fact(&self, fact: &mut Fact, argument: ResourceId) -> OntologyResult<()> {
        if !self.contains(argument) {
            let err = self.unknown(argument);
            tracing::warn!(error = %err, "rejected fact argument");
            return Err(err);
        }
        fact.push_argument(argument);
        Ok(())
    }

    /// Create a fact and append all `arguments`, stopping at the first rejected one.
    pub fn build_fact(&self, predicate: ResourceId, arguments: &[ResourceId]) -> OntologyResult<Fact> {
        let mut fact = self.create_fact(predicate)?;
        for &argument in arguments {
            self.add_argument_to_fact(&mut fact, argument)?;
        }
        Ok(fact)
    }

    /// Store a fact created by this database.
    pub fn add_fact(&mut self, fact: Fact) -> OntologyResult<()> {
        if fact.origin() != self.id {
            let err = OntologyError::ForeignFact {
                origin: fact.origin().get(),
                target: self.id.get(),
            };
            tracing::warn!(error = %err, "rejected fact");
            return Err(err);
        }
        if let Some(missing) = std::iter::once(fact.predicate())
            .chain(fact.arguments().iter().copied())
            .find(|id| !self.contains(*id))
        {
            return Err(self.unknown(missing));
        }
        tracing::debug!(fact = %self.render_fact(&fact), "added fact");
        self.facts.push(fact);
        Ok(())
    }

    /// Resources with their handles, in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        let db = self.id;
        self.resources
            .iter()
            .enumerate()
            .map(move |(index, r)| (ResourceId::new(db, index), r))
    }

    /// Stored facts in insertion order.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Render a fact as `pred(a, b).`
    pub fn render_fact(&self, fact: &Fact) -> String {
        let name = |id: ResourceId| self.name_of(id).unwrap_or("?").to_string();
        let args: Vec<String> = fact.arguments().iter().map(|&a| name(a)).collect();
        format!("{}({}).", name(fact.predicate()), args.join(", "))
    }

    /// Name-resolved snapshot of the database.
    pub fn export(&self) -> KnowledgeExport {
        let resources = self
            .resources()
            .map(|(id, r)| ResourceExport {
                index: id.index(),
                name: r.name().to_string(),
            })
            .collect();
        let facts = self
            .facts
            .iter()
            .map(|f| FactExport {
                predicate_index: f.predicate().index(),
                predicate: self.name_of(f.predicate()).unwrap_or_default().to_string(),
                arguments: f
                    .arguments()
                    .iter()
                    .map(|&a| self.name_of(a).unwrap_or_default().to_string())
                    .collect(),
            })
            .collect();
        KnowledgeExport {
            database: self.id.get(),
            resources,
            facts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_find_resources() {
        let mut db = Database::new();
        let car = db.add_resource(Resource::new("car"));
        let vehicle = db.add_resource(Resource::new("vehicle"));
        assert_eq!(db.find_resource("car"), Some(car));
        assert_eq!(db.find_resource("vehicle"), Some(vehicle));
        assert_eq!(db.find_resource("boat"), None);
        assert_eq!(db.name_of(car), Some("car"));
        assert_eq!(db.resource_count(), 2);
    }

    #[test]
    fn empty_name_is_not_found() {
        let mut db = Database::new();
        db.add_resource(Resource::new(""));
        assert_eq!(db.find_resource(""), None);
    }

    #[test]
    fn duplicate_names_are_distinct_handles() {
        let mut db = Database::new();
        let first = db.add_resource(Resource::new("main"));
        let second = db.add_resource(Resource::new("main"));
        assert_ne!(first, second);
        assert_eq!(db.find_resource("main"), Some(first));
    }

    #[test]
    fn create_fact_rejects_foreign_predicate() {
        let mut other = Database::new();
        let foreign = other.add_resource(Resource::new("p"));
        let db = Database::new();
        assert!(matches!(
            db.create_fact(foreign),
            Err(OntologyError::UnknownResource { .. })
        ));
    }

    #[test]
    fn rejected_argument_leaves_fact_unchanged() {
        let mut db = Database::new();
        let mut other = Database::new();
        let p = db.add_resource(Resource::new("p"));
        let a = db.add_resource(Resource::new("a"));
        let stranger = other.add_resource(Resource::new("x"));

        let mut fact = db.create_fact(p).unwrap();
        db.add_argument_to_fact(&mut fact, a).unwrap();
        assert!(db.add_argument_to_fact(&mut fact, stranger).is_err());
        assert_eq!(fact.arguments(), &[a]);
    }

    #[test]
    fn add_fact_rejects_fact_from_other_database() {
        let mut db = Database::new();
        let mut other = Database::new();
        let p = other.add_resource(Resource::new("p"));
        let fact = other.create_fact(p).unwrap();
        assert!(matches!(
            db.add_fact(fact),
            Err(OntologyError::ForeignFact { .. })
        ));
        assert_eq!(db.fact_count(), 0);
    }

    #[test]
    fn render_fact_lists_arguments_in_order() {
        let mut db = Database::new();
        let sub = db.add_resource(Resource::new("subclassOf"));
        let car = db.add_resource(Resource::new("car"));
        let vehicle = db.add_resource(Resource::new("vehicle"));
        let fact = db.build_fact(sub, &[car, vehicle]).unwrap();
        assert_eq!(db.render_fact(&fact), "subclassOf(car, vehicle).");

        let nullary = db.create_fact(sub).unwrap();
        assert_eq!(db.render_fact(&nullary), "subclassOf().");
    }

    #[test]
    fn integrity_holds_after_rejected_calls() {
        let mut db = Database::new();
        let mut other = Database::new();
        let p = db.add_resource(Resource::new("p"));
        let a = db.add_resource(Resource::new("a"));
        let x = other.add_resource(Resource::new("x"));

        let _ = db.build_fact(p, &[a, x]);
        let _ = db.create_fact(x);
        db.add_fact(db.build_fact(p, &[a]).unwrap()).unwrap();

        for fact in db.facts() {
            assert!(db.contains(fact.predicate()));
            assert!(fact.arguments().iter().all(|&id| db.contains(id)));
        }
    }

    #[test]
    fn export_resolves_names() {
        let mut db = Database::new();
        let p = db.add_resource(Resource::new("likes"));
        let a = db.add_resource(Resource::new("alice"));
        let b = db.add_resource(Resource::new("bob"));
        db.add_fact(db.build_fact(p, &[a, b]).unwrap()).unwrap();

        let export = db.export();
        assert_eq!(export.database, db.id().get());
        assert_eq!(export.resources.len(), 3);
        assert_eq!(export.facts[0].predicate, "likes");
        assert_eq!(export.facts[0].arguments, vec!["alice", "bob"]);

        let json = serde_json::to_string_pretty(&export).unwrap();
        assert!(json.contains("\"alice\""));
    }
}
