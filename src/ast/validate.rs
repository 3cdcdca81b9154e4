//! Program-level validation of a parsed AST.

use super::error::{ValidationError, ValidationResult};
use super::Node;

/// Check that a parsed program can be executed.
///
/// Rules, in order: the program must not be empty, its root must be a
/// translation unit, every top-level function must be named by a plain
/// identifier, and a function called `entry_point` must exist.
pub fn validate_program(root: Option<&Node>, entry_point: &str) -> ValidationResult<()> {
    let root = root.ok_or(ValidationError::EmptyProgram)?;
    let Node::TranslationUnit { items } = root else {
        return Err(ValidationError::NotTranslationUnit { actual: root.kind() });
    };

    for (index, item) in items.iter().enumerate() {
        if let Node::Function { signature, .. } = item {
            let name_kind = match signature.as_ref() {
                Node::Signature { name } => name.kind(),
                other => other.kind(),
            };
            if item.function_name().is_none() {
                return Err(ValidationError::InvalidSignature {
                    index,
                    actual: name_kind,
                });
            }
        }
    }

    if find_function(root, entry_point).is_none() {
        return Err(ValidationError::EntryPointMissing {
            name: entry_point.to_string(),
        });
    }
    Ok(())
}

/// First top-level function definition named `name`.
pub fn find_function<'a>(root: &'a Node, name: &str) -> Option<&'a Node> {
    root.items()?
        .iter()
        .find(|item| item.function_name() == Some(name))
}

/// All top-level function definitions in source order.
pub fn functions(root: &Node) -> impl Iterator<Item = &Node> {
    root.items()
        .unwrap_or(&[])
        .iter()
        .filter(|item| matches!(item, Node::Function { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::NodeKind;

    fn func(name: Node) -> Node {
        new_function(new_signature(name), None).unwrap()
    }

    #[test]
    fn empty_program_is_rejected() {
        assert!(matches!(
            validate_program(None, "main"),
            Err(ValidationError::EmptyProgram)
        ));
    }

    #[test]
    fn root_must_be_translation_unit() {
        let root = new_int(1);
        assert!(matches!(
            validate_program(Some(&root), "main"),
            Err(ValidationError::NotTranslationUnit {
                actual: NodeKind::Int
            })
        ));
    }

    #[test]
    fn malformed_signature_reported_before_missing_main() {
        let root = new_translation_unit(vec![func(new_str("helper")), func(new_int(7))]);
        assert!(matches!(
            validate_program(Some(&root), "main"),
            Err(ValidationError::InvalidSignature {
                index: 1,
                actual: NodeKind::Int
            })
        ));
    }

    #[test]
    fn missing_entry_point() {
        let root = new_translation_unit(vec![func(new_str("helper"))]);
        let err = validate_program(Some(&root), "main").unwrap_err();
        assert_eq!(err.to_string(), "missing main function");
    }

    #[test]
    fn custom_entry_point() {
        let root = new_translation_unit(vec![func(new_str("start"))]);
        assert!(validate_program(Some(&root), "start").is_ok());
        assert!(validate_program(Some(&root), "main").is_err());
    }

    #[test]
    fn find_function_returns_first_match() {
        let first = new_function(
            new_signature(new_str("dup")),
            Some({
                let mut b = new_compound(vec![new_int(1)]);
                convert_compound_to_sequence(&mut b).unwrap();
                b
            }),
        )
        .unwrap();
        let root = new_translation_unit(vec![first.clone(), func(new_str("dup"))]);
        assert_eq!(find_function(&root, "dup"), Some(&first));
        assert_eq!(find_function(&root, "nope"), None);
        assert_eq!(functions(&root).count(), 2);
    }
}
