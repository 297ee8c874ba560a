//! `expect(spy.calledWith(a)).toBe(true)` → `expect(spy).toHaveBeenCalledWith(a)`.

use super::{parse_assertion, Assertion};
use crate::transform::{candidates, synth, PassContext};
use crate::tree::{NodeId, Tree};

const RULE: &str = "called_with";

struct CalledWithAssertion {
    assertion: Assertion,
    spy: NodeId,
    args: Vec<NodeId>,
    inverted: bool,
}

fn called_with_assertion(tree: &Tree, id: NodeId) -> Option<CalledWithAssertion> {
    let assertion = parse_assertion(tree, id)?;
    let mc = tree.method_call(assertion.subject)?;
    let inverted = match mc.name {
        "calledWith" => false,
        "notCalledWith" => true,
        _ => return None,
    };
    let (spy, args) = (mc.object, mc.args.to_vec());
    Some(CalledWithAssertion {
        assertion,
        spy,
        args,
        inverted,
    })
}

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    for id in candidates(tree, |t, id| called_with_assertion(t, id).is_some()) {
        if !tree.is_attached(id) {
            continue;
        }
        let Some(found) = called_with_assertion(tree, id) else {
            continue;
        };
        let negated = found.assertion.negated() != found.inverted;
        let replacement = synth::expect_assertion(
            tree,
            found.spy,
            &found.assertion.segments,
            negated,
            "toHaveBeenCalledWith",
            found.args,
        );
        tree.replace(found.assertion.node, replacement);
        ctx.record(tree, RULE, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_support::run_pass;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_called_with() {
        let source = "expect(spy.calledWith(1, 2, 3)).toBe(true);\nexpect(spy.notCalledWith(1, 2, 3)).toBe(true);\nexpect(spy.calledWith(x)).toBeFalsy();\n";
        assert_eq!(
            run_pass(source, run),
            "expect(spy).toHaveBeenCalledWith(1, 2, 3);\nexpect(spy).not.toHaveBeenCalledWith(1, 2, 3);\nexpect(spy).not.toHaveBeenCalledWith(x);\n"
        );
    }

    #[test]
    fn test_chained_called_with() {
        let source = "expect(api.get.calledWith('/users')).to.be.true\nexpect(api.get.notCalledWith('/users')).to.be.false\n";
        assert_eq!(
            run_pass(source, run),
            "expect(api.get).toHaveBeenCalledWith('/users')\nexpect(api.get).toHaveBeenCalledWith('/users')\n"
        );
    }

    #[test]
    fn test_other_methods_untouched() {
        let source = "expect(spy.returned(1)).toBe(true)\n";
        assert_eq!(run_pass(source, run), source);
    }
}
