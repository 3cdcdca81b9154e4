//! Rich diagnostic error types for the ontc toolchain.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong
//! and how to fix it. The front-end errors (syntax, AST construction and
//! validation) live next to their modules; the runtime errors live here.

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::error::{AstError, ValidationError};
use crate::syntax::error::SyntaxError;

/// Top-level error type for the ontc toolchain.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum OntcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ast(#[from] AstError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("unknown resource: {resource} is not registered in database {database}")]
    #[diagnostic(
        code(ontc::ontology::unknown_resource),
        help(
            "Facts may only reference resources that were added to the same database. \
             Register the resource with `Database::add_resource` first, or look it up \
             with `Database::find_resource`."
        )
    )]
    UnknownResource { resource: String, database: u64 },

    #[error("fact belongs to database {origin}, cannot be added to database {target}")]
    #[diagnostic(
        code(ontc::ontology::foreign_fact),
        help(
            "A fact is bound to the database that created it. \
             Build the fact with `create_fact` on the database you want to store it in."
        )
    )]
    ForeignFact { origin: u64, target: u64 },

    #[error("no query goal: {reason}")]
    #[diagnostic(
        code(ontc::ontology::invalid_query),
        help(
            "A triple query fixes exactly one of subject or object. \
             Pass `Some` for the anchor and `None` for the position you want returned."
        )
    )]
    InvalidQuery { reason: String },

    #[error("malformed fact: predicate \"{predicate}\" has {arity} argument(s), expected at least 2")]
    #[diagnostic(
        code(ontc::ontology::malformed_fact),
        severity(Warning),
        help(
            "Triple queries only consider binary facts. \
             This fact was skipped; add a second argument if it is meant to take part in queries."
        )
    )]
    MalformedFact { predicate: String, arity: usize },
}

/// Convenience alias for ontology operations.
pub type OntologyResult<T> = std::result::Result<T, OntologyError>;

// ---------------------------------------------------------------------------
// Execution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExecError {
    #[error("missing entry point: no function named \"{name}\"")]
    #[diagnostic(
        code(ontc::exec::entry_point_missing),
        help("Define the entry point, e.g. `fn {name}() {{ println(\"hello\"); }}`.")
    )]
    EntryPointMissing { name: String },

    #[error("cyclic predecessor chain: {chain}")]
    #[diagnostic(
        code(ontc::exec::cyclic_dependency),
        help(
            "Functions linked through `isPreceededBy` form a loop. \
             Remove one of the triple facts so the chain terminates."
        )
    )]
    CyclicDependency { chain: String },

    #[error("call depth {depth} exceeds the configured limit of {limit}")]
    #[diagnostic(
        code(ontc::exec::depth_exceeded),
        help("Shorten the predecessor chain or raise `max_call_depth` in the configuration.")
    )]
    DepthExceeded { depth: usize, limit: usize },

    #[error("failed to write program output: {source}")]
    #[diagnostic(
        code(ontc::exec::output),
        help("The output stream was closed or is not writable.")
    )]
    Output {
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for execution operations.
pub type ExecResult<T> = std::result::Result<T, ExecError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    #[diagnostic(
        code(ontc::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {message}")]
    #[diagnostic(
        code(ontc::config::parse),
        help("The config file is not valid TOML. Compare it with the output of `Config::default()`.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config at {path}: {source}")]
    #[diagnostic(
        code(ontc::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    #[diagnostic(
        code(ontc::config::no_home),
        help("Set the HOME environment variable or pass `--config <path>` explicitly.")
    )]
    NoConfigDir,
}

/// Convenience alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for top-level operations.
pub type OntcResult<T> = std::result::Result<T, OntcError>;
