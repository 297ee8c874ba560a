//! `sinon.spy(...)` / `sinon.stub(...)` → `jest.fn()` / `jest.spyOn(...)`.

use std::collections::HashSet;

use super::scope::{in_setup_hook, statement_boundary};
use super::{candidates, synth, PassContext};
use crate::tree::{NodeId, NodeKind, Tree};

const RULE: &str = "stubs";
const SPY_METHODS: &[&str] = &["spy", "stub"];

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    // Statements that already end in `.mockClear()`.
    let mut cleared = HashSet::new();
    for call in candidates(tree, |t, id| is_spy_creation(t, ctx, id)) {
        if tree.is_attached(call) {
            rewrite(tree, ctx, call, &mut cleared);
        }
    }
}

fn is_spy_creation(tree: &Tree, ctx: &PassContext<'_>, id: NodeId) -> bool {
    tree.method_call(id).is_some_and(|mc| {
        SPY_METHODS.contains(&mc.name) && ctx.is_binding(tree, mc.object) && mc.args.len() <= 3
    })
}

fn rewrite(
    tree: &mut Tree,
    ctx: &mut PassContext<'_>,
    call: NodeId,
    cleared: &mut HashSet<NodeId>,
) {
    let Some(args) = tree.call(call).map(|(_, args)| args.to_vec()) else {
        return;
    };

    let replacement = match args.as_slice() {
        [] => synth::mock_fn(tree),
        [implementation] => {
            let mock = synth::mock_fn(tree);
            synth::with_implementation(tree, mock, *implementation)
        }
        [target, method, rest @ ..] => {
            let mut spy = synth::spy_on(tree, *target, *method);
            if let [implementation] = rest {
                spy = synth::with_implementation(tree, spy, *implementation);
            }
            spy
        }
    };

    // Bare mocks are fresh per test; only installed spies keep history
    // across tests and need clearing in a setup hook.
    if args.len() >= 2 && in_setup_hook(tree, call, ctx.options) {
        let boundary = statement_boundary(tree, call);
        if !cleared.insert(boundary.node) {
            tree.replace(call, replacement);
        } else if boundary.depth == 0 {
            let with_clear = synth::mock_clear(tree, replacement);
            tree.replace(call, with_clear);
        } else {
            tree.replace(call, replacement);
            let end = match tree.kind(boundary.node) {
                NodeKind::ExpressionStatement(expr) => Some(*expr),
                NodeKind::VariableDeclarator { init, .. } => *init,
                _ => None,
            };
            if let Some(end) = end {
                tree.wrap(end, synth::mock_clear);
            }
        }
    } else {
        tree.replace(call, replacement);
    }

    ctx.record(tree, RULE, call);
}
