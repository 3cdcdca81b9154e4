//! OXPL front end: source text to AST.
//!
//! ```text
//! source ──→ lexer::tokenize ──→ Vec<Token> ──→ parser::Parser ──→ Option<ast::Node>
//! ```
//!
//! An empty program (no items) parses to `Ok(None)`, which is distinct from a
//! syntax failure.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{SyntaxError, SyntaxResult};

use crate::ast::Node;

/// Parse OXPL source into a translation unit, or `None` if it has no items.
pub fn parse_program(source: &str) -> SyntaxResult<Option<Node>> {
    let tokens = lexer::tokenize(source)?;
    tracing::debug!(tokens = tokens.len(), "tokenized source");
    let root = parser::Parser::new(tokens).parse_program()?;
    if let Some(root) = &root {
        tracing::debug!(nodes = root.node_count(), "parsed program");
    }
    Ok(root)
}
