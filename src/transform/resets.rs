//! Restores and resets.

use super::{candidates, synth, PassContext};
use crate::tree::Tree;

const RULE: &str = "resets";

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    // `sinon.restore()` first: it looks like any other `.restore()`.
    let namespace_restores = candidates(tree, |t, id| {
        t.method_call(id)
            .is_some_and(|mc| mc.name == "restore" && ctx.is_binding(t, mc.object))
    });
    for id in namespace_restores {
        if let Some(mc) = tree.method_call(id) {
            let (object, property) = (mc.object, mc.property);
            tree.rename(object, synth::JEST);
            tree.rename(property, "restoreAllMocks");
            ctx.record(tree, RULE, id);
        }
    }

    let resets = candidates(tree, |t, id| {
        t.method_call(id)
            .is_some_and(|mc| matches!(mc.name, "restore" | "reset"))
    });
    for id in resets {
        let Some(mc) = tree.method_call(id) else {
            continue;
        };
        let target = match mc.name {
            "restore" => "mockRestore",
            _ => "mockReset",
        };
        let property = mc.property;
        tree.rename(property, target);
        ctx.record(tree, RULE, id);
    }
}
