//! Statement boundaries and setup-hook detection.

use crate::config::TransformOptions;
use crate::tree::{NodeId, NodeKind, Tree};

/// The statement-level node a call site belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// An expression statement, a variable declarator, or the program root.
    pub node: NodeId,
    /// Ancestors walked between the call site and `node`; 0 when the call
    /// is the statement's expression or the declarator's initializer.
    pub depth: usize,
}

/// Walk up from `id` to the nearest expression statement or variable declarator.
pub fn statement_boundary(tree: &Tree, id: NodeId) -> Boundary {
    let mut depth = 0;
    for ancestor in tree.ancestors(id) {
        match tree.kind(ancestor) {
            NodeKind::ExpressionStatement(_)
            | NodeKind::VariableDeclarator { .. }
            | NodeKind::Program(_) => {
                return Boundary {
                    node: ancestor,
                    depth,
                }
            }
            _ => depth += 1,
        }
    }
    Boundary {
        node: tree.root(),
        depth,
    }
}

/// Whether the statement containing `id` sits directly inside a setup hook
/// such as `beforeEach(() => { ... })`.
///
/// Only the nearest enclosing call counts: a spy created inside a helper
/// call inside the hook is not considered part of the hook.
pub fn in_setup_hook(tree: &Tree, id: NodeId, options: &TransformOptions) -> bool {
    let boundary = statement_boundary(tree, id);
    std::iter::once(boundary.node)
        .chain(tree.ancestors(boundary.node))
        .find_map(|node| tree.call(node))
        .and_then(|(callee, _)| tree.identifier(callee))
        .is_some_and(|name| options.is_setup_hook(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{self, SourceLanguage};
    use crate::tree;

    fn tree_of(source: &str) -> Tree {
        let parsed = parser::parse(SourceLanguage::JavaScript, source).unwrap();
        tree::build(&parsed, source)
    }

    fn call_named(tree: &Tree, name: &str) -> NodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|&id| tree.method_call(id).is_some_and(|mc| mc.name == name))
            .unwrap()
    }

    #[test]
    fn test_boundary_depth() {
        let tree = tree_of("sinon.stub(a, 'b')\nconst s = sinon.spy(a, 'b')\nsinon.mock(a, 'b').returns(1)\n");

        let stub = statement_boundary(&tree, call_named(&tree, "stub"));
        assert_eq!(stub.depth, 0);
        assert!(matches!(tree.kind(stub.node), NodeKind::ExpressionStatement(_)));

        let spy = statement_boundary(&tree, call_named(&tree, "spy"));
        assert_eq!(spy.depth, 0);
        assert!(matches!(tree.kind(spy.node), NodeKind::VariableDeclarator { .. }));

        let chained = statement_boundary(&tree, call_named(&tree, "mock"));
        assert_eq!(chained.depth, 2);
    }

    #[test]
    fn test_setup_hook_detection() {
        let options = TransformOptions::default();
        let tree = tree_of(
            "beforeEach(() => {\n  sinon.stub(a, 'b')\n})\nit('x', () => {\n  sinon.spy(a, 'b')\n})\n",
        );
        assert!(in_setup_hook(&tree, call_named(&tree, "stub"), &options));
        assert!(!in_setup_hook(&tree, call_named(&tree, "spy"), &options));
    }

    #[test]
    fn test_top_level_is_not_a_hook() {
        let tree = tree_of("sinon.stub(a, 'b')\n");
        assert!(!in_setup_hook(
            &tree,
            call_named(&tree, "stub"),
            &TransformOptions::default()
        ));
    }
}
