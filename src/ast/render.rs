//! Text renderings of an AST: an indented tree and a Graphviz digraph.

use std::fmt::Write;

use super::Node;

fn label(node: &Node) -> String {
    let kind = node.kind().to_string();
    match node {
        Node::Int(v) => format!("{kind} {v}"),
        Node::Float(v) => format!("{kind} {v}"),
        Node::Str(s) => format!("{kind} {s:?}"),
        Node::Scope { segments } => format!("{kind} {}", segments.join("::")),
        Node::Address {
            param: Some(param), ..
        } => format!("{kind} .{param}"),
        Node::VarSignature { name, .. } => format!("{kind} {name}"),
        Node::For { binding, .. } => format!("{kind} {binding}"),
        Node::Class { name, .. } => format!("{kind} {name}"),
        _ => kind,
    }
}

/// Indented tree, one node per line, two spaces per level.
pub fn tree(root: &Node) -> String {
    fn visit(node: &Node, depth: usize, out: &mut String) {
        let _ = writeln!(out, "{:indent$}{}", "", label(node), indent = depth * 2);
        for slot in node.slots() {
            match slot {
                Some(child) => visit(child, depth + 1, out),
                None => {
                    let _ = writeln!(out, "{:indent$}-", "", indent = (depth + 1) * 2);
                }
            }
        }
    }

    let mut out = String::new();
    visit(root, 0, &mut out);
    out
}

/// Graphviz `digraph ast` with one edge per parent/child pair.
pub fn dot(root: &Node) -> String {
    fn visit(node: &Node, id: usize, next_id: &mut usize, out: &mut String) {
        let escaped = label(node).replace('\\', "\\\\").replace('"', "\\\"");
        let _ = writeln!(out, "  n{id} [label=\"{escaped}\"];");
        for child in node.children() {
            let child_id = *next_id;
            *next_id += 1;
            let _ = writeln!(out, "  n{id} -> n{child_id};");
            visit(child, child_id, next_id, out);
        }
    }

    let mut out = String::from("digraph ast {\n");
    let mut next_id = 1;
    visit(root, 0, &mut next_id, &mut out);
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;

    fn program() -> Node {
        let call = new_call(new_scope(new_str("println")).unwrap(), vec![new_str("hi")]);
        let mut body = new_compound(vec![call]);
        convert_compound_to_sequence(&mut body).unwrap();
        let main = new_function(new_signature(new_str("main")), Some(body)).unwrap();
        new_translation_unit(vec![main])
    }

    #[test]
    fn tree_indents_by_depth() {
        let text = tree(&program());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "transunit");
        assert_eq!(lines[1], "  func");
        assert_eq!(lines[2], "    sig");
        assert_eq!(lines[3], "      str \"main\"");
        assert!(text.contains("scope println"));
    }

    #[test]
    fn tree_marks_empty_slots() {
        let f = new_function(new_signature(new_str("f")), None).unwrap();
        let text = tree(&f);
        assert_eq!(text.lines().last(), Some("  -"));
    }

    #[test]
    fn dot_has_one_edge_per_child() {
        let root = program();
        let text = dot(&root);
        assert!(text.starts_with("digraph ast {"));
        assert!(text.trim_end().ends_with('}'));
        let edges = text.lines().filter(|l| l.contains("->")).count();
        assert_eq!(edges, root.node_count() - 1);
    }

    #[test]
    fn dot_escapes_quotes() {
        let text = dot(&new_str("say \"hi\""));
        assert_eq!(
            text.lines().nth(1),
            Some(r#"  n0 [label="str \"say \\\"hi\\\"\""];"#)
        );
    }
}
