//! Tree-walking executor driven by the knowledge base.
//!
//! A run has two phases:
//!
//! 1. **Population**: the two built-in predicates are registered, every
//!    top-level function becomes a resource named after it, and every
//!    top-level triple fact whose relation and subject resolve is stored.
//! 2. **Execution**: starting at the entry point, each function first prints
//!    the test message if `printsATestMessageWhenCalled(fn)` holds, then runs
//!    every `isPreceededBy` predecessor in fact order, then dispatches the
//!    builtin calls at the top level of its body.
//!
//! Problems that only affect one fact or one call are recorded as
//! [`Notice`]s and execution continues. Missing entry points and predecessor
//! cycles abort the run.

pub mod builtin;
pub mod notice;

use std::io::Write;

pub use builtin::{ArgumentMismatch, Builtin};
pub use notice::{Layer, Notice, NoticeKind};

use crate::ast::error::ValidationError;
use crate::ast::validate::{find_function, functions, validate_program};
use crate::ast::Node;
use crate::config::Config;
use crate::error::{ExecError, ExecResult, OntcResult};
use crate::ontology::{Database, Resource, ResourceId};

/// Predicate naming the functions that must run before a function's body.
pub const PRECEDED_BY: &str = "isPreceededBy";
/// Predicate licensing a function to print the test message when called.
pub const PRINTS_TEST_MESSAGE: &str = "printsATestMessageWhenCalled";

/// Handles of the built-in predicates in a populated database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicates {
    pub preceded_by: ResourceId,
    pub prints_test_message: ResourceId,
}

/// Fill `db` from the top-level items of `root`.
///
/// Function names and predicates are registered first, so a triple fact may
/// refer to a function defined after it.
pub fn populate(root: &Node, db: &mut Database, notices: &mut Vec<Notice>) -> Predicates {
    let predicates = Predicates {
        preceded_by: db.add_resource(Resource::new(PRECEDED_BY)),
        prints_test_message: db.add_resource(Resource::new(PRINTS_TEST_MESSAGE)),
    };

    for func in functions(root) {
        match func.function_name() {
            Some(name) => {
                db.add_resource(Resource::new(name));
            }
            None => tracing::debug!("skipping function with malformed signature"),
        }
    }

    for item in root.items().unwrap_or(&[]) {
        if let Node::TripleFact {
            relation,
            subject,
            object,
        } = item
        {
            store_triple(db, relation, subject, object.as_deref(), notices);
        }
    }

    tracing::info!(
        resources = db.resource_count(),
        facts = db.fact_count(),
        "populated knowledge base"
    );
    predicates
}

fn store_triple(
    db: &mut Database,
    relation: &Node,
    subject: &Node,
    object: Option<&Node>,
    notices: &mut Vec<Notice>,
) {
    let mut resolve = |node: &Node, role: &str| {
        let name = node.identifier().unwrap_or_default();
        let found = db.find_resource(&name);
        if found.is_none() {
            push_notice(
                notices,
                Notice::new(
                    Layer::Ontology,
                    NoticeKind::UnknownSentencePart,
                    format!("unknown sentence part: {role} `{name}` is not a known resource"),
                ),
            );
        }
        found
    };
    let (Some(rel), Some(subj)) = (resolve(relation, "relation"), resolve(subject, "subject")) else {
        return;
    };

    let object = object.map(|node| {
        let name = node.identifier().unwrap_or_default();
        (db.find_resource(&name), name)
    });

    let built = db.create_fact(rel).and_then(|mut fact| {
        db.add_argument_to_fact(&mut fact, subj)?;
        match object {
            Some((Some(obj), _)) => db.add_argument_to_fact(&mut fact, obj)?,
            Some((None, ref name)) => push_notice(
                notices,
                Notice::new(
                    Layer::Ontology,
                    NoticeKind::UnresolvedObject,
                    format!(
                        "object `{name}` of `{}` is not a known resource, fact stored without it",
                        db.name_of(rel).unwrap_or_default()
                    ),
                ),
            ),
            None => {}
        }
        Ok(fact)
    });
    if let Err(err) = built.and_then(|fact| db.add_fact(fact)) {
        push_notice(
            notices,
            Notice::new(Layer::Ontology, NoticeKind::RejectedByStore, err.to_string()),
        );
    }
}

fn push_notice(notices: &mut Vec<Notice>, notice: Notice) {
    tracing::debug!(layer = notice.layer.tag(), "{}", notice.message);
    notices.push(notice);
}

/// Everything a finished run leaves behind.
#[derive(Debug)]
pub struct RunReport<W> {
    pub database: Database,
    pub notices: Vec<Notice>,
    pub output: W,
}

/// Interprets one program against its knowledge base.
pub struct Executor<'a, W: Write> {
    root: &'a Node,
    config: &'a Config,
    db: Database,
    predicates: Predicates,
    out: W,
    notices: Vec<Notice>,
    /// Functions currently executing, outermost first.
    chain: Vec<String>,
}

impl<'a, W: Write> Executor<'a, W> {
    /// Create an executor and populate a fresh knowledge base from `root`.
    pub fn new(root: &'a Node, config: &'a Config, out: W) -> Self {
        let mut db = Database::new();
        let mut notices = Vec::new();
        let predicates = populate(root, &mut db, &mut notices);
        Self {
            root,
            config,
            db,
            predicates,
            out,
            notices,
            chain: Vec::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn predicates(&self) -> Predicates {
        self.predicates
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    fn notice(&mut self, layer: Layer, kind: NoticeKind, message: String) {
        push_notice(&mut self.notices, Notice::new(layer, kind, message));
    }

    fn output_error(source: std::io::Error) -> ExecError {
        ExecError::Output { source }
    }

    /// Run from the configured entry point.
    pub fn run(&mut self) -> ExecResult<()> {
        let entry = self.config.entry_point.as_str();
        let main = find_function(self.root, entry).ok_or_else(|| ExecError::EntryPointMissing {
            name: entry.to_string(),
        })?;
        self.execute_function(main)?;
        self.out.flush().map_err(Self::output_error)
    }

    /// Execute one function definition, predecessors first.
    pub fn execute_function(&mut self, func: &'a Node) -> ExecResult<()> {
        let Some(name) = func.function_name() else {
            self.notice(
                Layer::Ast,
                NoticeKind::UnknownFunction,
                "cannot execute a function without an identifier".into(),
            );
            return Ok(());
        };

        if self.chain.iter().any(|active| active == name) {
            let mut chain = self.chain.clone();
            chain.push(name.to_string());
            return Err(ExecError::CyclicDependency {
                chain: chain.join(" -> "),
            });
        }
        if self.chain.len() >= self.config.max_call_depth {
            return Err(ExecError::DepthExceeded {
                depth: self.chain.len() + 1,
                limit: self.config.max_call_depth,
            });
        }

        tracing::debug!(function = name, depth = self.chain.len(), "executing function");
        self.chain.push(name.to_string());
        let result = self.execute_in_frame(func, name);
        self.chain.pop();
        result
    }

    fn execute_in_frame(&mut self, func: &'a Node, name: &str) -> ExecResult<()> {
        match self.db.find_resource(name) {
            Some(me) => {
                self.test_message_hook(me)?;
                self.run_predecessors(me)?;
            }
            None => self.notice(
                Layer::Ontology,
                NoticeKind::RejectedByStore,
                format!("function `{name}` is not a resource, skipping fact checks"),
            ),
        }

        for statement in func.function_body() {
            match statement {
                Node::Call { callee, args } => self.execute_call(callee, args)?,
                other => tracing::debug!(kind = %other.kind(), "statement not executed"),
            }
        }
        Ok(())
    }

    fn test_message_hook(&mut self, me: ResourceId) -> ExecResult<()> {
        let probe = self.db.build_fact(self.predicates.prints_test_message, &[me]);
        match probe {
            Ok(fact) if self.db.check_fact(&fact) => {
                writeln!(self.out, "{}", self.config.test_message).map_err(Self::output_error)
            }
            Ok(_) => Ok(()),
            Err(err) => {
                self.notice(Layer::Ontology, NoticeKind::RejectedByStore, err.to_string());
                Ok(())
            }
        }
    }

    fn run_predecessors(&mut self, me: ResourceId) -> ExecResult<()> {
        let db = &self.db;
        let resolved: Result<Vec<String>, _> = db
            .query_triple(self.predicates.preceded_by, Some(me), None)
            .map(|matches| {
                matches
                    .filter_map(|id| db.name_of(id).map(str::to_string))
                    .collect()
            });
        let predecessors = match resolved {
            Ok(names) => names,
            Err(err) => {
                self.notice(Layer::Ontology, NoticeKind::RejectedByStore, err.to_string());
                return Ok(());
            }
        };

        for predecessor in predecessors {
            match find_function(self.root, &predecessor) {
                Some(func) => self.execute_function(func)?,
                None => self.notice(
                    Layer::Execution,
                    NoticeKind::MissingPredecessor,
                    format!("predecessor `{predecessor}` has no function definition, skipped"),
                ),
            }
        }
        Ok(())
    }

    fn execute_call(&mut self, callee: &Node, args: &[Node]) -> ExecResult<()> {
        let name = match callee {
            Node::Scope { segments } if segments.len() == 1 => segments[0].as_str(),
            other => {
                let shown = other.identifier().unwrap_or_else(|| other.kind().to_string());
                self.notice(
                    Layer::Execution,
                    NoticeKind::UnknownFunction,
                    format!("unknown function `{shown}`"),
                );
                return Ok(());
            }
        };

        let Some(builtin) = Builtin::from_name(name) else {
            self.notice(
                Layer::Execution,
                NoticeKind::UnknownFunction,
                format!("unknown function `{name}`"),
            );
            return Ok(());
        };

        match builtin.check_args(args) {
            Ok(text) => builtin.write(text, &mut self.out).map_err(Self::output_error),
            Err(mismatch) => {
                self.notice(
                    Layer::Execution,
                    NoticeKind::ArgumentMismatch,
                    format!("{}: {mismatch}", builtin.name()),
                );
                Ok(())
            }
        }
    }

    /// Consume the executor, returning the knowledge base, notices and output.
    pub fn finish(self) -> RunReport<W> {
        RunReport {
            database: self.db,
            notices: self.notices,
            output: self.out,
        }
    }
}

/// Validate `root` (if any), populate a knowledge base and run the entry point.
pub fn run_program<W: Write>(root: Option<&Node>, config: &Config, out: W) -> OntcResult<RunReport<W>> {
    validate_program(root, &config.entry_point)?;
    let root = root.ok_or(ValidationError::EmptyProgram)?;
    let mut executor = Executor::new(root, config, out);
    executor.run()?;
    Ok(executor.finish())
}

/// Parse and run OXPL source.
pub fn run_source<W: Write>(source: &str, config: &Config, out: W) -> OntcResult<RunReport<W>> {
    let root = crate::syntax::parse_program(source)?;
    run_program(root.as_ref(), config, out)
}

/// Receives the knowledge base of a finished run and becomes its owner.
pub trait Inspector {
    fn inspect(&mut self, database: Database) -> std::io::Result<()>;
}

/// Run a program, then hand its knowledge base to `inspector`.
///
/// Returns the notices of the run.
pub fn run_and_inspect<W: Write, I: Inspector>(
    root: Option<&Node>,
    config: &Config,
    out: W,
    inspector: &mut I,
) -> OntcResult<Vec<Notice>> {
    let report = run_program(root, config, out)?;
    inspector
        .inspect(report.database)
        .map_err(|source| ExecError::Output { source })?;
    Ok(report.notices)
}
