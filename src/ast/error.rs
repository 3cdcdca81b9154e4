//! Diagnostic error types for AST construction and validation.
//!
//! Construction errors come from the builder functions in [`super::build`]
//! when an input violates a node kind's shape contract. Validation errors
//! come from [`super::validate`] when a finished tree cannot be executed.

use miette::Diagnostic;
use thiserror::Error;

use super::NodeKind;

/// Errors raised while building AST nodes.
#[derive(Debug, Error, Diagnostic)]
pub enum AstError {
    #[error("empty scope")]
    #[diagnostic(
        code(ontc::ast::empty_scope),
        help("A scope path needs at least one non-empty identifier segment.")
    )]
    EmptyScope,

    #[error("scope identifier has to be a string, got {actual:?}")]
    #[diagnostic(
        code(ontc::ast::scope_not_identifier),
        help("Scope segments are identifiers. Pass a string node built with `new_str`.")
    )]
    ScopeNotIdentifier { actual: NodeKind },

    #[error("unknown operator: {operator:?}")]
    #[diagnostic(
        code(ontc::ast::unknown_operator),
        help(
            "Binary operators are `+ - * / % = & | ^ < >` and \
             `== != && || <= >= << >>`."
        )
    )]
    UnknownOperator { operator: String },

    #[error("unknown {affix} unary operator: {operator:?}")]
    #[diagnostic(
        code(ontc::ast::unknown_unary),
        help("Prefix operators are `+ - ++ --`; postfix operators are `++ --`.")
    )]
    InvalidUnaryOperator { affix: &'static str, operator: String },

    #[error("fact relation is missing")]
    #[diagnostic(
        code(ontc::ast::relation_missing),
        help("A triple fact is written `subject relation object;` and needs a relation scope.")
    )]
    RelationMissing,

    #[error("{slot}: expected {expected}, got {actual:?}")]
    #[diagnostic(
        code(ontc::ast::unexpected_kind),
        help(
            "A builder received a child of the wrong kind. \
             Check the order of the arguments passed to the builder."
        )
    )]
    UnexpectedKind {
        slot: &'static str,
        expected: &'static str,
        actual: NodeKind,
    },

    #[error("cannot convert {actual:?} into a sequence, only compound blocks convert")]
    #[diagnostic(
        code(ontc::ast::not_compound),
        help("Only nodes created with `new_compound` can be re-tagged as sequences.")
    )]
    NotCompound { actual: NodeKind },

    #[error("{actual:?} does not hold a statement list")]
    #[diagnostic(
        code(ontc::ast::not_sequence_kind),
        help(
            "`add_seq` appends to translation units, compound blocks, \
             sequences and class specs only."
        )
    )]
    NotSequenceKind { actual: NodeKind },
}

/// Convenience alias for AST construction.
pub type AstResult<T> = std::result::Result<T, AstError>;

/// Errors raised when a parsed program cannot be executed.
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("AST empty")]
    #[diagnostic(
        code(ontc::ast::empty_program),
        help("The source file contains no items. Add at least a `fn main() {{ }}`.")
    )]
    EmptyProgram,

    #[error("program root is {actual:?}, expected a translation unit")]
    #[diagnostic(
        code(ontc::ast::not_translation_unit),
        help("Build the program root with `new_translation_unit`.")
    )]
    NotTranslationUnit { actual: NodeKind },

    #[error("invalid fn sig: item {index} has a {actual:?} identifier")]
    #[diagnostic(
        code(ontc::ast::invalid_signature),
        help("Function signatures must be named with a plain identifier string.")
    )]
    InvalidSignature { index: usize, actual: NodeKind },

    #[error("missing {name} function")]
    #[diagnostic(
        code(ontc::ast::entry_point_missing),
        help("Define the entry point, e.g. `fn {name}() {{ println(\"hello\"); }}`.")
    )]
    EntryPointMissing { name: String },
}

/// Convenience alias for AST validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
