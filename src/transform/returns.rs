//! `.withArgs(...).returns(v)` and `.returns(v)`.

use super::matchers::matcher_token;
use super::{candidates, synth, PassContext};
use crate::tree::{NodeId, NodeKind, Tree};

const RULE: &str = "returns";

/// `<builder>.withArgs(m...).returns(v...)`, decomposed.
struct ArgumentChain {
    call: NodeId,
    builder: NodeId,
    with_args: NodeId,
    matchers: Vec<NodeId>,
    values: Vec<NodeId>,
}

fn argument_chain(tree: &Tree, id: NodeId) -> Option<ArgumentChain> {
    let returns = tree.method_call(id)?;
    if returns.name != "returns" {
        return None;
    }
    let with_args = tree.method_call(returns.object)?;
    if with_args.name != "withArgs" {
        return None;
    }
    Some(ArgumentChain {
        call: id,
        builder: with_args.object,
        with_args: returns.object,
        matchers: with_args.args.to_vec(),
        values: returns.args.to_vec(),
    })
}

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    for id in candidates(tree, |t, id| argument_chain(t, id).is_some()) {
        if !tree.is_attached(id) {
            continue;
        }
        if let Some(chain) = argument_chain(tree, id) {
            rewrite_chain(tree, ctx, chain);
        }
    }

    // Whatever `.returns(v)` is left sets a plain return value.
    for id in candidates(tree, |t, id| t.method_call(id).is_some_and(|mc| mc.name == "returns")) {
        if let Some(property) = tree.method_call(id).map(|mc| mc.property) {
            tree.rename(property, "mockReturnValue");
            ctx.record(tree, RULE, id);
        }
    }
}

fn rewrite_chain(tree: &mut Tree, ctx: &mut PassContext<'_>, chain: ArgumentChain) {
    let Some(&value) = chain.values.first() else {
        // Nothing to return: drop `.withArgs(..)` and keep the call.
        tree.replace(chain.with_args, chain.builder);
        return;
    };
    // Spread matchers have no fixed position to compare against.
    let spread = chain
        .matchers
        .iter()
        .any(|&m| tree.syntax(m) == Some("spread_element"));
    if chain.matchers.is_empty() || spread {
        tree.replace(chain.with_args, chain.builder);
        return;
    }

    let declared = chain.matchers.len();
    let mut condition: Option<NodeId> = None;
    for (i, &matcher) in chain.matchers.iter().enumerate() {
        let check = match matcher_token(tree, ctx, matcher) {
            Some(token) => match token.runtime_tag() {
                Some(tag) => {
                    let arg = synth::positional_arg(tree, i);
                    let type_of = tree.alloc(NodeKind::Unary {
                        operator: "typeof",
                        argument: arg,
                    });
                    let tag = tree.alloc(NodeKind::Str(tag.to_string()));
                    synth::binary(tree, "===", type_of, tag)
                }
                None => {
                    let args = synth::ident(tree, "args");
                    let length = synth::member(tree, args, "length");
                    let count = tree.alloc(NodeKind::Number(declared.to_string()));
                    synth::binary(tree, ">=", length, count)
                }
            },
            None => {
                let arg = synth::positional_arg(tree, i);
                synth::binary(tree, "===", arg, matcher)
            }
        };
        condition = Some(match condition {
            Some(left) => synth::binary(tree, "&&", left, check),
            None => check,
        });
    }
    let Some(condition) = condition else {
        return;
    };

    let implementation = synth::conditional_implementation(tree, condition, value);
    let replacement = synth::with_implementation(tree, chain.builder, implementation);
    tree.replace(chain.call, replacement);
    ctx.record(tree, RULE, chain.call);
}
