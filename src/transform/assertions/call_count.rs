//! `expect(spy.called).toBe(true)` → `expect(spy).toHaveBeenCalled()`.

use super::{parse_assertion, Assertion};
use crate::transform::{candidates, synth, PassContext};
use crate::tree::{NodeId, NodeKind, Tree};

const RULE: &str = "call_count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountProperty {
    Called,
    CalledOnce,
    CalledTwice,
    CalledThrice,
    CallCount,
    NotCalled,
}

impl CountProperty {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "called" => CountProperty::Called,
            "calledOnce" => CountProperty::CalledOnce,
            "calledTwice" => CountProperty::CalledTwice,
            "calledThrice" => CountProperty::CalledThrice,
            "callCount" => CountProperty::CallCount,
            "notCalled" => CountProperty::NotCalled,
            _ => return None,
        })
    }

    /// The calledWith form used when the spy is narrowed by `withArgs(..)`.
    fn with_args_method(self) -> Option<&'static str> {
        match self {
            CountProperty::Called | CountProperty::CalledOnce => Some("calledWith"),
            CountProperty::NotCalled => Some("notCalledWith"),
            _ => None,
        }
    }
}

struct CountAssertion {
    assertion: Assertion,
    spy: NodeId,
    property: CountProperty,
}

fn count_assertion(tree: &Tree, id: NodeId) -> Option<CountAssertion> {
    let assertion = parse_assertion(tree, id)?;
    let (spy, _) = tree.member(assertion.subject)?;
    let property = CountProperty::from_name(tree.member_name(assertion.subject)?)?;
    if property == CountProperty::CallCount && assertion.args.len() != 1 {
        return None;
    }
    Some(CountAssertion {
        assertion,
        spy,
        property,
    })
}

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    for id in candidates(tree, |t, id| count_assertion(t, id).is_some()) {
        if !tree.is_attached(id) {
            continue;
        }
        if let Some(found) = count_assertion(tree, id) {
            if rewrite(tree, found) {
                ctx.record(tree, RULE, id);
            }
        }
    }
}

fn rewrite(tree: &mut Tree, found: CountAssertion) -> bool {
    let CountAssertion {
        assertion,
        spy,
        property,
    } = found;

    // `spy.withArgs(a).called` is `spy.calledWith(a)`; the calledWith rule
    // finishes the job.
    if let Some(narrowed) = tree.method_call(spy).filter(|mc| mc.name == "withArgs") {
        let (receiver, args) = (narrowed.object, narrowed.args.to_vec());
        let Some(method) = property.with_args_method() else {
            return false;
        };
        let replacement = synth::method_call(tree, receiver, method, args);
        tree.replace(assertion.subject, replacement);
        return true;
    }

    let negated = assertion.negated() != (property == CountProperty::NotCalled);
    let (method, args) = match property {
        CountProperty::Called | CountProperty::CalledOnce | CountProperty::NotCalled => {
            ("toHaveBeenCalled", Vec::new())
        }
        CountProperty::CalledTwice => ("toHaveBeenCalledTimes", vec![count(tree, 2)]),
        CountProperty::CalledThrice => ("toHaveBeenCalledTimes", vec![count(tree, 3)]),
        CountProperty::CallCount => ("toHaveBeenCalledTimes", assertion.args.clone()),
    };
    let replacement =
        synth::expect_assertion(tree, spy, &assertion.segments, negated, method, args);
    tree.replace(assertion.node, replacement);
    true
}

fn count(tree: &mut Tree, n: usize) -> NodeId {
    tree.alloc(NodeKind::Number(n.to_string()))
}
