//! Recoverable diagnostics collected during a run.
//!
//! A [`Notice`] records a problem that was handled locally (a skipped fact,
//! an ignored call) so execution could continue. Each carries the layer
//! that raised it, printed as a one-letter prefix.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Toolchain layer a notice originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Lexical,
    Syntax,
    Ast,
    Ontology,
    Execution,
}

impl Layer {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Lexical => "[L]",
            Self::Syntax => "[P]",
            Self::Ast => "[A]",
            Self::Ontology => "[O]",
            Self::Execution => "[E]",
        }
    }
}

/// What went wrong, without the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    /// A triple fact names a relation or subject that is not a resource.
    UnknownSentencePart,
    /// A triple fact's object is not a resource; the fact was stored without it.
    UnresolvedObject,
    /// The knowledge base rejected an operation.
    RejectedByStore,
    /// A predecessor resource has no function definition.
    MissingPredecessor,
    /// A call to something that is not a builtin.
    UnknownFunction,
    /// A builtin called with the wrong number or type of arguments.
    ArgumentMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub layer: Layer,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(layer: Layer, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            layer,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.layer.tag(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_layer_tag() {
        let notice = Notice::new(Layer::Execution, NoticeKind::UnknownFunction, "unknown function `f`");
        assert_eq!(notice.to_string(), "[E] unknown function `f`");
        assert_eq!(Layer::Ontology.tag(), "[O]");
        assert_eq!(Layer::Syntax.tag(), "[P]");
    }
}
