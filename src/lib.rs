// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ontc
//!
//! Toolchain for OXPL, a small language that mixes imperative functions with
//! ontology facts. Facts declared in a program decide how its functions run.
//!
//! ## Architecture
//!
//! - **Syntax** (`syntax`): Lexer and recursive-descent parser producing an AST
//! - **AST** (`ast`): Node model, checked builders, validation and renderers
//! - **Ontology** (`ontology`): Knowledge base of resources and facts with triple queries
//! - **Execution** (`exec`): Populates the knowledge base and interprets from `main`
//! - **Shell** (`shell`): Line-oriented inspection of a knowledge base
//!
//! ## Library usage
//!
//! ```no_run
//! use ontc::config::Config;
//! use ontc::exec::run_source;
//!
//! let source = r#"
//!     fn main() { println("hi"); }
//!     fn setup() { println("setup"); }
//!     main isPreceededBy setup;
//! "#;
//! let report = run_source(source, &Config::default(), std::io::stdout()).unwrap();
//! assert_eq!(report.database.fact_count(), 1);
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod exec;
pub mod export;
pub mod ontology;
pub mod shell;
pub mod syntax;
