//! Builders for replacement fragments.
//!
//! Every builder allocates fresh nodes and adopts the nodes it is handed, so
//! a parsed argument moved into a synthesized call still prints verbatim.

use crate::tree::{NodeId, NodeKind, Tree};

/// Target framework namespace.
pub const JEST: &str = "jest";
/// Target assertion entry point.
pub const EXPECT: &str = "expect";

pub fn ident(tree: &mut Tree, name: &str) -> NodeId {
    tree.alloc(NodeKind::Identifier(name.to_string()))
}

pub fn member(tree: &mut Tree, object: NodeId, property: &str) -> NodeId {
    let property = ident(tree, property);
    tree.alloc(NodeKind::Member { object, property })
}

pub fn call(tree: &mut Tree, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
    tree.alloc(NodeKind::Call { callee, arguments })
}

/// `object.method(arguments)`
pub fn method_call(
    tree: &mut Tree,
    object: NodeId,
    method: &str,
    arguments: Vec<NodeId>,
) -> NodeId {
    let callee = member(tree, object, method);
    call(tree, callee, arguments)
}

/// `namespace.name`, e.g. `jest.fn` or `expect.any`.
pub fn qualified(tree: &mut Tree, namespace: &str, name: &str) -> NodeId {
    let object = ident(tree, namespace);
    member(tree, object, name)
}

/// `jest.fn()`
pub fn mock_fn(tree: &mut Tree) -> NodeId {
    let callee = qualified(tree, JEST, "fn");
    call(tree, callee, Vec::new())
}

/// `jest.spyOn(target, method)`
pub fn spy_on(tree: &mut Tree, target: NodeId, method: NodeId) -> NodeId {
    let callee = qualified(tree, JEST, "spyOn");
    call(tree, callee, vec![target, method])
}

/// `mock.mockImplementation(implementation)`
pub fn with_implementation(tree: &mut Tree, mock: NodeId, implementation: NodeId) -> NodeId {
    method_call(tree, mock, "mockImplementation", vec![implementation])
}

/// `expr.mockClear()`
pub fn mock_clear(tree: &mut Tree, expr: NodeId) -> NodeId {
    method_call(tree, expr, "mockClear", Vec::new())
}

/// `args[index]`
pub fn positional_arg(tree: &mut Tree, index: usize) -> NodeId {
    let object = ident(tree, "args");
    let index = tree.alloc(NodeKind::Number(index.to_string()));
    tree.alloc(NodeKind::Index { object, index })
}

pub fn binary(tree: &mut Tree, operator: &'static str, left: NodeId, right: NodeId) -> NodeId {
    tree.alloc(NodeKind::Binary {
        operator,
        left,
        right,
    })
}

/// `(...args) => {\n  if (condition) return value;\n}`
pub fn conditional_implementation(tree: &mut Tree, condition: NodeId, value: NodeId) -> NodeId {
    let rest_name = ident(tree, "args");
    let rest = tree.alloc(NodeKind::Rest(rest_name));
    let ret = tree.alloc(NodeKind::Return(Some(value)));
    let check = tree.alloc(NodeKind::If {
        test: condition,
        consequent: ret,
    });
    let body = tree.alloc(NodeKind::Block(vec![check]));
    tree.alloc(NodeKind::Arrow {
        params: vec![rest],
        body,
    })
}

/// `expect(subject).<segments>.[not.]method(arguments)`
pub fn expect_assertion(
    tree: &mut Tree,
    subject: NodeId,
    segments: &[String],
    negated: bool,
    method: &str,
    arguments: Vec<NodeId>,
) -> NodeId {
    let expect = ident(tree, EXPECT);
    let mut chain = call(tree, expect, vec![subject]);
    for segment in segments {
        chain = member(tree, chain, segment);
    }
    if negated {
        chain = member(tree, chain, "not");
    }
    method_call(tree, chain, method, arguments)
}
