//! Builder functions for AST nodes.
//!
//! The parser constructs every node through these functions. Each builder
//! takes already-constructed children and checks the shape contract of the
//! node kind it produces; a violation yields an [`AstError`] instead of a
//! malformed node.

use super::error::{AstError, AstResult};
use super::{Affix, BinaryOp, Node, NodeKind, UnaryOp};

fn expect_kind(slot: &'static str, expected: &'static str, node: &Node, kind: NodeKind) -> AstResult<()> {
    if node.kind() == kind {
        Ok(())
    } else {
        Err(AstError::UnexpectedKind {
            slot,
            expected,
            actual: node.kind(),
        })
    }
}

fn identifier_text(slot: &'static str, node: Node) -> AstResult<String> {
    match node {
        Node::Str(s) => Ok(s),
        other => Err(AstError::UnexpectedKind {
            slot,
            expected: "identifier string",
            actual: other.kind(),
        }),
    }
}

fn scope_segment(node: Node) -> AstResult<String> {
    match node {
        Node::Str(s) if s.is_empty() => Err(AstError::EmptyScope),
        Node::Str(s) => Ok(s),
        other => Err(AstError::ScopeNotIdentifier {
            actual: other.kind(),
        }),
    }
}

// ── Leaves ──────────────────────────────────────────────────────────────

pub fn new_int(value: i64) -> Node {
    Node::Int(value)
}

pub fn new_float(value: f64) -> Node {
    Node::Float(value)
}

pub fn new_str(value: impl Into<String>) -> Node {
    Node::Str(value.into())
}

// ── Names ───────────────────────────────────────────────────────────────

/// Start a scope path with its first segment.
pub fn new_scope(first: Node) -> AstResult<Node> {
    Ok(Node::Scope {
        segments: vec![scope_segment(first)?],
    })
}

/// Append a segment to an existing scope path (`a::b` becomes `a::b::c`).
pub fn scope_add(scope: &mut Node, segment: Node) -> AstResult<()> {
    let Node::Scope { segments } = scope else {
        return Err(AstError::UnexpectedKind {
            slot: "scope_add",
            expected: "scope",
            actual: scope.kind(),
        });
    };
    segments.push(scope_segment(segment)?);
    Ok(())
}

/// An address is a scope with an optional `.param` identifier.
pub fn new_address(scope: Node, param: Option<Node>) -> AstResult<Node> {
    expect_kind("address scope", "scope", &scope, NodeKind::Scope)?;
    let param = param.map(|p| identifier_text("address param", p)).transpose()?;
    Ok(Node::Address {
        scope: Box::new(scope),
        param,
    })
}

// ── Expressions ─────────────────────────────────────────────────────────

pub fn new_call(callee: Node, args: Vec<Node>) -> Node {
    Node::Call {
        callee: Box::new(callee),
        args,
    }
}

fn binop(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    Node::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Binary operation from a single-character operator (`+ - * / % = & | ^ < >`).
pub fn new_binop(op: char, lhs: Node, rhs: Node) -> AstResult<Node> {
    let op = BinaryOp::from_char(op).ok_or_else(|| AstError::UnknownOperator {
        operator: op.to_string(),
    })?;
    Ok(binop(op, lhs, rhs))
}

/// Binary operation from a multi-character operator (`== != && || <= >= << >>`).
///
/// Produces exactly the same node as the single-character builder would for
/// the same [`BinaryOp`].
pub fn new_binop_str(op: &str, lhs: Node, rhs: Node) -> AstResult<Node> {
    let mut chars = op.chars();
    let resolved = match (chars.next(), chars.next()) {
        (Some(c), None) => BinaryOp::from_char(c),
        _ => BinaryOp::from_multi_char(op),
    };
    let op = resolved.ok_or_else(|| AstError::UnknownOperator {
        operator: op.to_string(),
    })?;
    Ok(binop(op, lhs, rhs))
}

pub fn new_unop(affix: Affix, op: &str, operand: Node) -> AstResult<Node> {
    let op = match (affix, op) {
        (Affix::Prefix, "++") => UnaryOp::PreIncrement,
        (Affix::Prefix, "--") => UnaryOp::PreDecrement,
        (Affix::Prefix, "-") => UnaryOp::Negate,
        (Affix::Prefix, "+") => UnaryOp::Plus,
        (Affix::Postfix, "++") => UnaryOp::PostIncrement,
        (Affix::Postfix, "--") => UnaryOp::PostDecrement,
        _ => {
            return Err(AstError::InvalidUnaryOperator {
                affix: affix.as_str(),
                operator: op.to_string(),
            });
        }
    };
    Ok(Node::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn new_ternary(condition: Node, then_value: Node, else_value: Node) -> Node {
    Node::Ternary {
        condition: Box::new(condition),
        then_value: Box::new(then_value),
        else_value: Box::new(else_value),
    }
}

// ── Declarations ────────────────────────────────────────────────────────

pub fn new_signature(name: Node) -> Node {
    Node::Signature {
        name: Box::new(name),
    }
}

pub fn new_var_signature(name: Node, ty: Option<Node>) -> AstResult<Node> {
    let name = identifier_text("variable name", name)?;
    if let Some(ty) = &ty {
        expect_kind("variable type", "scope", ty, NodeKind::Scope)?;
    }
    Ok(Node::VarSignature {
        name,
        ty: ty.map(Box::new),
    })
}

/// Function definition. The body, when present, must be a sequence.
pub fn new_function(signature: Node, body: Option<Node>) -> AstResult<Node> {
    expect_kind("function signature", "signature", &signature, NodeKind::Signature)?;
    if let Some(body) = &body {
        expect_kind("function body", "sequence", body, NodeKind::Sequence)?;
    }
    Ok(Node::Function {
        signature: Box::new(signature),
        body: body.map(Box::new),
    })
}

pub fn new_var_decl(signature: Node, value: Option<Node>) -> AstResult<Node> {
    expect_kind("declaration", "variable signature", &signature, NodeKind::VarSignature)?;
    Ok(Node::VarDecl {
        signature: Box::new(signature),
        value: value.map(Box::new),
    })
}

pub fn new_class(name: Node, spec: Node) -> AstResult<Node> {
    let name = identifier_text("class name", name)?;
    expect_kind("class body", "class spec", &spec, NodeKind::ClassSpec)?;
    Ok(Node::Class {
        name,
        spec: Box::new(spec),
    })
}

pub fn new_class_spec(items: Vec<Node>) -> Node {
    Node::ClassSpec { items }
}

// ── Facts ───────────────────────────────────────────────────────────────

/// First-order fact `relation(args...)`.
pub fn new_fact(relation: Node, args: Vec<Node>) -> AstResult<Node> {
    expect_kind("fact relation", "scope", &relation, NodeKind::Scope)?;
    Ok(Node::Fact {
        relation: Box::new(relation),
        args,
    })
}

/// Triple fact, written `subject relation object?` in source.
pub fn new_triple_fact(subject: Node, relation: Option<Node>, object: Option<Node>) -> AstResult<Node> {
    let relation = relation.ok_or(AstError::RelationMissing)?;
    expect_kind("fact relation", "scope", &relation, NodeKind::Scope)?;
    expect_kind("fact subject", "address", &subject, NodeKind::Address)?;
    if let Some(object) = &object {
        expect_kind("fact object", "address", object, NodeKind::Address)?;
    }
    Ok(Node::TripleFact {
        relation: Box::new(relation),
        subject: Box::new(subject),
        object: object.map(Box::new),
    })
}

// ── Statements ──────────────────────────────────────────────────────────

pub fn new_conditional(condition: Node, then_branch: Node, else_branch: Option<Node>) -> Node {
    Node::Conditional {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    }
}

pub fn new_return(value: Option<Node>) -> Node {
    Node::Return {
        value: value.map(Box::new),
    }
}

pub fn new_break() -> Node {
    Node::Break
}

pub fn new_continue() -> Node {
    Node::Continue
}

pub fn new_while(condition: Node, body: Option<Node>) -> AstResult<Node> {
    if let Some(body) = &body {
        expect_kind("loop body", "sequence", body, NodeKind::Sequence)?;
    }
    Ok(Node::While {
        condition: Box::new(condition),
        body: body.map(Box::new),
    })
}

pub fn new_for(binding: Node, iterable: Node, body: Option<Node>) -> AstResult<Node> {
    let binding = identifier_text("loop binding", binding)?;
    if let Some(body) = &body {
        expect_kind("loop body", "sequence", body, NodeKind::Sequence)?;
    }
    Ok(Node::For {
        binding,
        iterable: Box::new(iterable),
        body: body.map(Box::new),
    })
}

// ── Lists ───────────────────────────────────────────────────────────────

pub fn new_compound(items: Vec<Node>) -> Node {
    Node::Compound { items }
}

pub fn new_translation_unit(items: Vec<Node>) -> Node {
    Node::TranslationUnit { items }
}

/// Append a successor to a list-bearing node.
pub fn add_seq(list: &mut Node, successor: Node) -> AstResult<()> {
    match list {
        Node::TranslationUnit { items }
        | Node::ClassSpec { items }
        | Node::Sequence { items }
        | Node::Compound { items } => {
            items.push(successor);
            Ok(())
        }
        other => Err(AstError::NotSequenceKind {
            actual: other.kind(),
        }),
    }
}

/// Re-tag a compound block as a sequence, in place.
///
/// This is the only builder that changes an existing node's kind.
pub fn convert_compound_to_sequence(node: &mut Node) -> AstResult<()> {
    let Node::Compound { items } = node else {
        return Err(AstError::NotCompound { actual: node.kind() });
    };
    let items = std::mem::take(items);
    *node = Node::Sequence { items };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(name: &str) -> Node {
        new_scope(new_str(name)).unwrap()
    }

    fn addr(name: &str) -> Node {
        new_address(scope(name), None).unwrap()
    }

    #[test]
    fn scope_rejects_empty_and_non_string() {
        assert!(matches!(new_scope(new_str("")), Err(AstError::EmptyScope)));
        assert!(matches!(
            new_scope(new_int(4)),
            Err(AstError::ScopeNotIdentifier {
                actual: NodeKind::Int
            })
        ));
    }

    #[test]
    fn scope_add_appends_segments_in_order() {
        let mut s = scope("a");
        scope_add(&mut s, new_str("b")).unwrap();
        scope_add(&mut s, new_str("c")).unwrap();
        assert_eq!(
            s,
            Node::Scope {
                segments: vec!["a".into(), "b".into(), "c".into()]
            }
        );
        assert!(scope_add(&mut s, new_float(1.0)).is_err());
        assert!(scope_add(&mut new_int(1), new_str("x")).is_err());
    }

    #[test]
    fn single_and_multi_char_operators_share_node_shape() {
        let a = new_binop('<', new_int(1), new_int(2)).unwrap();
        let b = new_binop_str("<", new_int(1), new_int(2)).unwrap();
        assert_eq!(a, b);

        let eq = new_binop_str("==", new_int(1), new_int(2)).unwrap();
        assert_eq!(eq.kind(), NodeKind::Binary(BinaryOp::Eq));

        let assign = new_binop('=', scope("x"), new_int(2)).unwrap();
        assert_eq!(assign.kind(), NodeKind::Binary(BinaryOp::Assign));
    }

    #[test]
    fn unknown_operators_fail() {
        assert!(matches!(
            new_binop('@', new_int(1), new_int(2)),
            Err(AstError::UnknownOperator { .. })
        ));
        assert!(matches!(
            new_binop_str("<=>", new_int(1), new_int(2)),
            Err(AstError::UnknownOperator { .. })
        ));
        assert!(matches!(
            new_unop(Affix::Postfix, "-", new_int(1)),
            Err(AstError::InvalidUnaryOperator { .. })
        ));
    }

    #[test]
    fn unary_operators_keep_affix() {
        let pre = new_unop(Affix::Prefix, "++", scope("i")).unwrap();
        let post = new_unop(Affix::Postfix, "++", scope("i")).unwrap();
        assert_eq!(pre.kind(), NodeKind::Unary(UnaryOp::PreIncrement));
        assert_eq!(post.kind(), NodeKind::Unary(UnaryOp::PostIncrement));
    }

    #[test]
    fn triple_fact_requires_relation() {
        assert!(matches!(
            new_triple_fact(addr("main"), None, Some(addr("setup"))),
            Err(AstError::RelationMissing)
        ));
        let fact = new_triple_fact(addr("main"), Some(scope("isPreceededBy")), Some(addr("setup"))).unwrap();
        assert_eq!(fact.kind(), NodeKind::TripleFact);
    }

    #[test]
    fn triple_fact_checks_slot_kinds() {
        let err = new_triple_fact(new_int(1), Some(scope("r")), None).unwrap_err();
        assert!(matches!(
            err,
            AstError::UnexpectedKind {
                slot: "fact subject",
                ..
            }
        ));
    }

    #[test]
    fn function_requires_signature_and_sequence_body() {
        assert!(new_function(new_str("main"), None).is_err());

        let body = new_compound(vec![]);
        assert!(new_function(new_signature(new_str("main")), Some(body)).is_err());

        let mut body = new_compound(vec![]);
        convert_compound_to_sequence(&mut body).unwrap();
        assert!(new_function(new_signature(new_str("main")), Some(body)).is_ok());
    }

    #[test]
    fn compound_converts_once() {
        let mut block = new_compound(vec![new_int(1), new_int(2)]);
        convert_compound_to_sequence(&mut block).unwrap();
        assert_eq!(block.kind(), NodeKind::Sequence);
        assert_eq!(block.items().map(<[Node]>::len), Some(2));

        assert!(matches!(
            convert_compound_to_sequence(&mut block),
            Err(AstError::NotCompound {
                actual: NodeKind::Sequence
            })
        ));
    }

    #[test]
    fn add_seq_only_on_lists() {
        let mut unit = new_translation_unit(vec![]);
        add_seq(&mut unit, new_int(1)).unwrap();
        add_seq(&mut unit, new_int(2)).unwrap();
        assert_eq!(unit.items(), Some(&[new_int(1), new_int(2)][..]));

        let mut leaf = new_int(0);
        assert!(matches!(
            add_seq(&mut leaf, new_int(1)),
            Err(AstError::NotSequenceKind { .. })
        ));
    }

    #[test]
    fn address_param_must_be_identifier() {
        let ok = new_address(scope("obj"), Some(new_str("field"))).unwrap();
        assert!(matches!(ok, Node::Address { param: Some(ref p), .. } if p == "field"));
        assert!(new_address(scope("obj"), Some(new_int(0))).is_err());
        assert!(new_address(new_str("obj"), None).is_err());
    }

    #[test]
    fn declarations_validate_children() {
        let sig = new_var_signature(new_str("x"), Some(scope("int"))).unwrap();
        assert!(new_var_decl(sig, Some(new_int(3))).is_ok());
        assert!(new_var_decl(new_int(3), None).is_err());

        assert!(new_class(new_str("Car"), new_class_spec(vec![])).is_ok());
        assert!(new_class(new_str("Car"), new_compound(vec![])).is_err());
        assert!(new_for(new_int(1), scope("xs"), None).is_err());
    }
}
