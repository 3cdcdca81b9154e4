//! Diagnostic error types for lexing and parsing OXPL source.
//!
//! Every variant carries the byte span of the offending text as a miette
//! label, so the CLI can render the error against the source file.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::error::AstError;

/// Errors produced while turning source text into an AST.
#[derive(Debug, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("{line}:{column}: unexpected character {ch:?}")]
    #[diagnostic(
        code(ontc::lex::unexpected_char),
        help("This character is not part of OXPL. Remove it or put it inside a string literal.")
    )]
    UnexpectedChar {
        ch: char,
        line: usize,
        column: usize,
        #[label("not valid here")]
        span: SourceSpan,
    },

    #[error("{line}:{column}: unterminated string literal")]
    #[diagnostic(
        code(ontc::lex::unterminated_string),
        help("Close the string with a matching `\"` on the same line.")
    )]
    UnterminatedString {
        line: usize,
        column: usize,
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("{line}:{column}: invalid escape sequence \\{escape}")]
    #[diagnostic(
        code(ontc::lex::invalid_escape),
        help("Supported escapes are \\n, \\t, \\\\ and \\\".")
    )]
    InvalidEscape {
        escape: char,
        line: usize,
        column: usize,
        #[label("unknown escape")]
        span: SourceSpan,
    },

    #[error("{line}:{column}: integer literal {literal} is out of range")]
    #[diagnostic(
        code(ontc::lex::integer_range),
        help("Integer literals must fit in a signed 64-bit integer.")
    )]
    IntegerOutOfRange {
        literal: String,
        line: usize,
        column: usize,
        #[label("too large")]
        span: SourceSpan,
    },

    #[error("{line}:{column}: expected {expected}, found {found}")]
    #[diagnostic(
        code(ontc::parse::unexpected_token),
        help("Check the statement for a missing `;`, bracket or operand.")
    )]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
        #[label("unexpected")]
        span: SourceSpan,
    },

    #[error("{line}:{column}: {source}")]
    #[diagnostic(
        code(ontc::parse::invalid_construct),
        help("The construct is syntactically complete but its parts have the wrong shape.")
    )]
    InvalidConstruct {
        #[source]
        source: AstError,
        line: usize,
        column: usize,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("{line}:{column}: nesting deeper than {limit} levels")]
    #[diagnostic(
        code(ontc::parse::nesting_too_deep),
        help("Split the expression or block into smaller functions or variables.")
    )]
    NestingTooDeep {
        limit: usize,
        line: usize,
        column: usize,
        #[label("limit reached here")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    /// One-based line and column of the error.
    pub fn position(&self) -> (usize, usize) {
        match self {
            Self::UnexpectedChar { line, column, .. }
            | Self::UnterminatedString { line, column, .. }
            | Self::InvalidEscape { line, column, .. }
            | Self::IntegerOutOfRange { line, column, .. }
            | Self::UnexpectedToken { line, column, .. }
            | Self::InvalidConstruct { line, column, .. }
            | Self::NestingTooDeep { line, column, .. } => (*line, *column),
        }
    }

    /// Whether the error was raised by the lexer rather than the parser.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedChar { .. }
                | Self::UnterminatedString { .. }
                | Self::InvalidEscape { .. }
                | Self::IntegerOutOfRange { .. }
        )
    }
}

/// Convenience alias for lexing and parsing.
pub type SyntaxResult<T> = std::result::Result<T, SyntaxError>;
