//! Abstract syntax tree for OXPL programs.
//!
//! Every node is a variant of [`Node`] with explicitly named child slots.
//! Variable-length lists (translation-unit items, block statements, call
//! arguments) are plain `Vec`s, so a tree is finite and acyclic by
//! construction and each node is owned by exactly one parent slot.
//!
//! Nodes are created through the builder functions in [`build`], which check
//! the shape contract of each kind before linking children.

pub mod build;
pub mod error;
pub mod render;
pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary operators, including assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Assign,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Gt,
    Eq,
    Ne,
    And,
    Or,
    Le,
    Ge,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Map a single-character operator token.
    pub fn from_char(op: char) -> Option<Self> {
        Some(match op {
            '+' => Self::Add,
            '-' => Self::Sub,
            '*' => Self::Mul,
            '/' => Self::Div,
            '%' => Self::Rem,
            '=' => Self::Assign,
            '&' => Self::BitAnd,
            '|' => Self::BitOr,
            '^' => Self::BitXor,
            '<' => Self::Lt,
            '>' => Self::Gt,
            _ => return None,
        })
    }

    /// Map a multi-character operator token.
    pub fn from_multi_char(op: &str) -> Option<Self> {
        Some(match op {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "&&" => Self::And,
            "||" => Self::Or,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            _ => return None,
        })
    }

    /// The operator as written in source.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Assign => "=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Shl => "<<",
            Self::Shr => ">>",
        }
    }
}

/// Unary operators. Increments and decrements remember their affix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Negate,
    Plus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::PreIncrement | Self::PostIncrement => "++",
            Self::PreDecrement | Self::PostDecrement => "--",
            Self::Negate => "-",
            Self::Plus => "+",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, Self::PostIncrement | Self::PostDecrement)
    }
}

/// Whether a unary operator is written before or after its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affix {
    Prefix,
    Postfix,
}

impl Affix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
        }
    }
}

/// Payload-free tag of a node, used in diagnostics and kind checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    TranslationUnit,
    Int,
    Float,
    Str,
    Scope,
    Address,
    Call,
    Unary(UnaryOp),
    Binary(BinaryOp),
    Signature,
    VarSignature,
    Function,
    Fact,
    TripleFact,
    Conditional,
    Ternary,
    Return,
    Break,
    Continue,
    While,
    For,
    VarDecl,
    Class,
    ClassSpec,
    Sequence,
    Compound,
}

impl NodeKind {
    /// Short lowercase label used by the renderers.
    pub fn label(self) -> &'static str {
        match self {
            Self::TranslationUnit => "transunit",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Scope => "scope",
            Self::Address => "addr",
            Self::Call => "call",
            Self::Unary(_) => "unop",
            Self::Binary(BinaryOp::Assign) => "assign",
            Self::Binary(_) => "binop",
            Self::Signature => "sig",
            Self::VarSignature => "sigvar",
            Self::Function => "func",
            Self::Fact => "fact",
            Self::TripleFact => "tfact",
            Self::Conditional => "cond",
            Self::Ternary => "ternary",
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::While => "while",
            Self::For => "for",
            Self::VarDecl => "vardecl",
            Self::Class => "class",
            Self::ClassSpec => "classspec",
            Self::Sequence => "seq",
            Self::Compound => "compound",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary(op) => write!(f, "unop({})", op.symbol()),
            Self::Binary(BinaryOp::Assign) => f.write_str("assign"),
            Self::Binary(op) => write!(f, "binop({})", op.symbol()),
            other => f.write_str(other.label()),
        }
    }
}

/// A node of the OXPL abstract syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    // ── Leaves ──────────────────────────────────────────────────────────
    Int(i64),
    Float(f64),
    Str(String),

    // ── Names and expressions ───────────────────────────────────────────
    /// A `::`-separated identifier path, at least one segment long.
    Scope {
        segments: Vec<String>,
    },
    /// A scope with an optional `.param` suffix.
    Address {
        scope: Box<Node>,
        param: Option<String>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    // ── Declarations ────────────────────────────────────────────────────
    /// Function signature. The name is checked by validation, not by the builder.
    Signature {
        name: Box<Node>,
    },
    VarSignature {
        name: String,
        ty: Option<Box<Node>>,
    },
    Function {
        signature: Box<Node>,
        body: Option<Box<Node>>,
    },
    /// First-order fact `relation(args...)`.
    Fact {
        relation: Box<Node>,
        args: Vec<Node>,
    },
    /// Triple fact `subject relation object?`.
    TripleFact {
        relation: Box<Node>,
        subject: Box<Node>,
        object: Option<Box<Node>>,
    },
    // ── Statements ──────────────────────────────────────────────────────
    Conditional {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    Ternary {
        condition: Box<Node>,
        then_value: Box<Node>,
        else_value: Box<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    Break,
    Continue,
    While {
        condition: Box<Node>,
        body: Option<Box<Node>>,
    },
    For {
        binding: String,
        iterable: Box<Node>,
        body: Option<Box<Node>>,
    },
    VarDecl {
        signature: Box<Node>,
        value: Option<Box<Node>>,
    },
    Class {
        name: String,
        spec: Box<Node>,
    },
    // ── Lists ───────────────────────────────────────────────────────────
    TranslationUnit {
        items: Vec<Node>,
    },
    ClassSpec {
        items: Vec<Node>,
    },
    Sequence {
        items: Vec<Node>,
    },
    Compound {
        items: Vec<Node>,
    },
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::TranslationUnit { .. } => NodeKind::TranslationUnit,
            Self::Int(_) => NodeKind::Int,
            Self::Float(_) => NodeKind::Float,
            Self::Str(_) => NodeKind::Str,
            Self::Scope { .. } => NodeKind::Scope,
            Self::Address { .. } => NodeKind::Address,
            Self::Call { .. } => NodeKind::Call,
            Self::Unary { op, .. } => NodeKind::Unary(*op),
            Self::Binary { op, .. } => NodeKind::Binary(*op),
            Self::Signature { .. } => NodeKind::Signature,
            Self::VarSignature { .. } => NodeKind::VarSignature,
            Self::Function { .. } => NodeKind::Function,
            Self::Fact { .. } => NodeKind::Fact,
            Self::TripleFact { .. } => NodeKind::TripleFact,
            Self::Conditional { .. } => NodeKind::Conditional,
            Self::Ternary { .. } => NodeKind::Ternary,
            Self::Return { .. } => NodeKind::Return,
            Self::Break => NodeKind::Break,
            Self::Continue => NodeKind::Continue,
            Self::While { .. } => NodeKind::While,
            Self::For { .. } => NodeKind::For,
            Self::VarDecl { .. } => NodeKind::VarDecl,
            Self::Class { .. } => NodeKind::Class,
            Self::ClassSpec { .. } => NodeKind::ClassSpec,
            Self::Sequence { .. } => NodeKind::Sequence,
            Self::Compound { .. } => NodeKind::Compound,
        }
    }

    /// Child slots in declaration order, including empty optional slots.
    ///
    /// Fixed-arity kinds always report the same number of slots: a function
    /// has two (signature, body), a triple fact three (relation, subject,
    /// object). List kinds report one filled slot per element.
    pub fn slots(&self) -> Vec<Option<&Node>> {
        match self {
            Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Scope { .. } => Vec::new(),
            Self::Break | Self::Continue => Vec::new(),
            Self::TranslationUnit { items }
            | Self::ClassSpec { items }
            | Self::Sequence { items }
            | Self::Compound { items } => items.iter().map(Some).collect(),
            Self::Address { scope, .. } => vec![Some(&**scope)],
            Self::Call { callee, args } => std::iter::once(Some(&**callee))
                .chain(args.iter().map(Some))
                .collect(),
            Self::Unary { operand, .. } => vec![Some(&**operand)],
            Self::Binary { lhs, rhs, .. } => vec![Some(&**lhs), Some(&**rhs)],
            Self::Signature { name } => vec![Some(&**name)],
            Self::VarSignature { ty, .. } => vec![ty.as_deref()],
            Self::Function { signature, body } => vec![Some(&**signature), body.as_deref()],
            Self::Fact { relation, args } => std::iter::once(Some(&**relation))
                .chain(args.iter().map(Some))
                .collect(),
            Self::TripleFact {
                relation,
                subject,
                object,
            } => vec![Some(&**relation), Some(&**subject), object.as_deref()],
            Self::Conditional {
                condition,
                then_branch,
                else_branch,
            } => vec![Some(&**condition), Some(&**then_branch), else_branch.as_deref()],
            Self::Ternary {
                condition,
                then_value,
                else_value,
            } => vec![Some(&**condition), Some(&**then_value), Some(&**else_value)],
            Self::Return { value } => vec![value.as_deref()],
            Self::While { condition, body } => vec![Some(&**condition), body.as_deref()],
            Self::For { iterable, body, .. } => vec![Some(&**iterable), body.as_deref()],
            Self::VarDecl { signature, value } => vec![Some(&**signature), value.as_deref()],
            Self::Class { spec, .. } => vec![Some(&**spec)],
        }
    }

    /// Present children in slot order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.slots().into_iter().flatten()
    }

    /// Pre-order traversal starting at (and including) this node.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including the root.
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Statement or item list of a list-bearing node.
    pub fn items(&self) -> Option<&[Node]> {
        match self {
            Self::TranslationUnit { items }
            | Self::ClassSpec { items }
            | Self::Sequence { items }
            | Self::Compound { items } => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Identifier text of a name-like node.
    ///
    /// Scopes join their segments with `::`, addresses resolve through their
    /// scope, strings are returned as-is.
    pub fn identifier(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Scope { segments } => Some(segments.join("::")),
            Self::Address { scope, .. } => scope.identifier(),
            Self::Signature { name } => name.as_str().map(str::to_string),
            _ => None,
        }
    }

    /// Name of a function definition, if its signature is well-formed.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::Function { signature, .. } => match signature.as_ref() {
                Self::Signature { name } => name.as_str(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Body statements of a function definition; empty when the body is none.
    pub fn function_body(&self) -> &[Node] {
        match self {
            Self::Function {
                body: Some(body), ..
            } => body.items().unwrap_or(&[]),
            _ => &[],
        }
    }
}

/// Pre-order iterator over a subtree. See [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<&'a Node> = node.slots().into_iter().flatten().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}
