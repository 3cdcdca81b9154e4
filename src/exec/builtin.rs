//! Built-in functions callable from OXPL programs.

use std::fmt;
use std::io::Write;

use crate::ast::{Node, NodeKind};

/// The builtins known to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Write a string without a trailing newline.
    Print,
    /// Write a string followed by a newline.
    Println,
}

/// Why a builtin call was rejected. Checked in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentMismatch {
    Missing,
    WrongType { actual: NodeKind },
    TooMany { count: usize },
}

impl fmt::Display for ArgumentMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("argument missing"),
            Self::WrongType { actual } => {
                write!(f, "wrong type of argument: expected a string literal, got {actual}")
            }
            Self::TooMany { count } => write!(f, "too many arguments: expected 1, got {count}"),
        }
    }
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "print" => Some(Self::Print),
            "println" => Some(Self::Println),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Println => "println",
        }
    }

    /// The single string-literal argument both builtins take.
    pub fn check_args(self, args: &[Node]) -> Result<&str, ArgumentMismatch> {
        let first = args.first().ok_or(ArgumentMismatch::Missing)?;
        let text = first.as_str().ok_or(ArgumentMismatch::WrongType {
            actual: first.kind(),
        })?;
        if args.len() > 1 {
            return Err(ArgumentMismatch::TooMany { count: args.len() });
        }
        Ok(text)
    }

    pub fn write<W: Write>(self, text: &str, out: &mut W) -> std::io::Result<()> {
        match self {
            Self::Print => out.write_all(text.as_bytes()),
            Self::Println => {
                out.write_all(text.as_bytes())?;
                out.write_all(b"\n")
            }
        }
    }
}
