//! Fake timers: `useFakeTimers`, `tick` and clock `restore`.

use std::collections::HashSet;

use super::{candidates, synth, PassContext};
use crate::tree::{NodeId, NodeKind, Tree};

const RULE: &str = "timers";

fn is_install(tree: &Tree, ctx: &PassContext<'_>, id: NodeId) -> bool {
    tree.method_call(id)
        .is_some_and(|mc| mc.name == "useFakeTimers" && ctx.is_binding(tree, mc.object))
}

/// Name a fake clock is stored in: `const c = <install>` or `c = <install>`.
fn assigned_name(tree: &Tree, install: NodeId) -> Option<&str> {
    let parent = tree.parent(install)?;
    match tree.kind(parent) {
        NodeKind::VariableDeclarator {
            name,
            init: Some(init),
        } if *init == install => tree.identifier(*name),
        NodeKind::Assignment { left, right } if *right == install => tree.identifier(*left),
        _ => None,
    }
}

/// `(receiver, property, new name)` for clock calls.
fn clock_call(
    tree: &Tree,
    ctx: &PassContext<'_>,
    assigned: &HashSet<String>,
    id: NodeId,
) -> Option<(NodeId, NodeId, &'static str)> {
    let mc = tree.method_call(id)?;
    let receiver = tree.identifier(mc.object)?;
    let is_clock = ctx.options.is_clock_identifier(receiver) || assigned.contains(receiver);
    match (mc.name, mc.args.len()) {
        ("tick", 1) => Some((mc.object, mc.property, "advanceTimersByTime")),
        // Other receivers' `.restore()` belongs to stubs.
        ("restore", 0) if is_clock => {
            Some((mc.object, mc.property, "useRealTimers"))
        }
        _ => None,
    }
}

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    let installs = candidates(tree, |t, id| is_install(t, ctx, id));

    let assigned: HashSet<String> = installs
        .iter()
        .filter_map(|&install| assigned_name(tree, install))
        .map(str::to_string)
        .collect();

    for id in candidates(tree, |t, id| clock_call(t, ctx, &assigned, id).is_some()) {
        if let Some((receiver, property, name)) = clock_call(tree, ctx, &assigned, id) {
            tree.rename(receiver, synth::JEST);
            tree.rename(property, name);
            ctx.record(tree, RULE, id);
        }
    }

    for install in installs {
        if !tree.is_attached(install) {
            continue;
        }
        let Some(receiver) = tree.method_call(install).map(|mc| mc.object) else {
            continue;
        };
        tree.rename(receiver, synth::JEST);
        collapse(tree, ctx, install);
        ctx.record(tree, RULE, install);
    }
}

/// Drop the clock variable an install was stored in once nothing reads it.
fn collapse(tree: &mut Tree, ctx: &mut PassContext<'_>, install: NodeId) {
    let Some(parent) = tree.parent(install) else {
        return;
    };
    match tree.kind(parent).clone() {
        NodeKind::Assignment { left, right } if right == install => {
            let in_statement = tree
                .parent(parent)
                .is_some_and(|p| matches!(tree.kind(p), NodeKind::ExpressionStatement(_)));
            let Some(name) = tree.identifier(left).map(str::to_string) else {
                return;
            };
            if !in_statement {
                return;
            }
            tree.replace(parent, install);
            if let Some(binding) = ctx.bindings.resolve(tree, install, &name) {
                if ctx.bindings.live_references(tree, binding) == 0 {
                    ctx.bindings.remove_declaration(tree, binding);
                }
            }
        }
        NodeKind::VariableDeclarator {
            init: Some(init), ..
        } if init == install => {
            let Some(binding) = ctx.bindings.declared_by(parent) else {
                return;
            };
            if ctx.bindings.live_references(tree, binding) > 0 {
                return;
            }
            let Some(declaration) = tree.parent(parent) else {
                return;
            };
            let single = matches!(
                tree.kind(declaration),
                NodeKind::VariableDeclaration { declarators, .. } if declarators.len() == 1
            );
            let in_list = tree.parent(declaration).is_some_and(|p| {
                tree.kind(p).is_statement_list() || tree.syntax(p) == Some("statement_block")
            });
            if single && in_list {
                let statement = tree.alloc(NodeKind::ExpressionStatement(install));
                tree.replace(declaration, statement);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_support::run_pass;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_install_tick_and_restore() {
        let source = "sinon.useFakeTimers()\nclock.restore()\nclock.tick(5)\n";
        assert_eq!(
            run_pass(source, run),
            "jest.useFakeTimers()\njest.useRealTimers()\njest.advanceTimersByTime(5)\n"
        );
    }

    #[test]
    fn test_assignment_collapses_and_declaration_goes() {
        let source = "let clock1\nbeforeEach(() => {\n  foo()\n  clock1 = sinon.useFakeTimers()\n  bar()\n})\n";
        assert_eq!(
            run_pass(source, run),
            "beforeEach(() => {\n  foo()\n  jest.useFakeTimers()\n  bar()\n})\n"
        );
    }

    #[test]
    fn test_unused_declaration_collapses() {
        let source = "foo()\nconst clock = sinon.useFakeTimers()\nbar()\n";
        assert_eq!(run_pass(source, run), "foo()\njest.useFakeTimers();\nbar()\n");
    }

    #[test]
    fn test_assigned_name_counts_as_clock() {
        let source = "let timer\ntimer = sinon.useFakeTimers()\ntimer.tick(10)\ntimer.restore()\n";
        assert_eq!(
            run_pass(source, run),
            "jest.useFakeTimers()\njest.advanceTimersByTime(10)\njest.useRealTimers()\n"
        );
    }

    #[test]
    fn test_declaration_with_other_reader_is_kept() {
        let source = "const clock = sinon.useFakeTimers()\nlog(clock)\n";
        assert_eq!(
            run_pass(source, run),
            "const clock = jest.useFakeTimers()\nlog(clock)\n"
        );
    }

    #[test]
    fn test_stub_restore_untouched() {
        let source = "stub.restore()\n";
        assert_eq!(run_pass(source, run), source);
    }
}
