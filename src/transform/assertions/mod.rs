//! Assertions on spy state, in two dialects:
//!
//! - method style: `expect(spy.called).toBe(true)`, `expect(spy.called).not.toBeFalsy()`
//! - chained style: `expect(spy.called).to.be.true`, `expect(spy.callCount).to.equal(2)`
//!
//! Both parse into an [`Assertion`]; the rules only look at its subject and
//! its negation.

pub mod call_count;
pub mod called_with;

use crate::tree::{NodeId, NodeKind, Tree};

/// Boolean-ish matchers of the method dialect.
const METHOD_TERMINALS: &[&str] = &["toBe", "toEqual", "toBeTruthy", "toBeFalsy"];
/// Equality calls of the chained dialect.
const CHAINED_CALL_TERMINALS: &[&str] = &["equal", "equals", "eq", "eql"];
/// Boolean properties of the chained dialect.
const CHAINED_PROPERTY_TERMINALS: &[&str] = &["true", "false", "ok"];
/// Chain words that carry no meaning and are dropped.
const LANGUAGE_CHAINS: &[&str] = &[
    "to", "be", "been", "is", "that", "which", "and", "has", "have", "with", "at", "of", "same",
    "but", "does", "still", "also", "deep",
];

/// An `expect(subject)...terminal` statement expression.
#[derive(Debug, Clone)]
pub struct Assertion {
    /// The expression to replace.
    pub node: NodeId,
    /// The argument of `expect(...)`.
    pub subject: NodeId,
    /// Chain segments to carry over, in order.
    pub segments: Vec<String>,
    pub has_not: bool,
    /// The terminal asserts falsiness (`toBeFalsy`, `.false`, a literal `false`).
    pub asserts_falsy: bool,
    /// Arguments of the terminal call.
    pub args: Vec<NodeId>,
}

impl Assertion {
    pub fn negated(&self) -> bool {
        negation(self.has_not, self.asserts_falsy)
    }
}

/// Whether an assertion is negated overall. A `not` and a falsy terminal
/// cancel each other out.
pub fn negation(has_not: bool, asserts_falsy: bool) -> bool {
    has_not != asserts_falsy
}

/// Parse the expression of an expression statement as an assertion.
pub fn parse_assertion(tree: &Tree, id: NodeId) -> Option<Assertion> {
    let statement = tree.parent(id)?;
    if !matches!(tree.kind(statement), NodeKind::ExpressionStatement(_)) {
        return None;
    }

    let (chain, terminal, args) = if let Some(mc) = tree.method_call(id) {
        if !METHOD_TERMINALS.contains(&mc.name) && !CHAINED_CALL_TERMINALS.contains(&mc.name) {
            return None;
        }
        (mc.object, mc.name, mc.args.to_vec())
    } else {
        let (object, _) = tree.member(id)?;
        let name = tree.member_name(id)?;
        if !CHAINED_PROPERTY_TERMINALS.contains(&name) {
            return None;
        }
        (object, name, Vec::new())
    };

    let mut names = Vec::new();
    let mut current = chain;
    while let Some((object, property)) = tree.member(current) {
        names.push(tree.identifier(property)?);
        current = object;
    }
    names.reverse();

    let (callee, expect_args) = tree.call(current)?;
    if !tree.is_identifier(callee, "expect") {
        return None;
    }
    let [subject] = expect_args else {
        return None;
    };

    let asserts_falsy = matches!(terminal, "toBeFalsy" | "false")
        || args
            .first()
            .is_some_and(|&arg| tree.kind(arg) == &NodeKind::Bool(false));

    Some(Assertion {
        node: id,
        subject: *subject,
        segments: names
            .iter()
            .filter(|name| **name != "not" && !LANGUAGE_CHAINS.contains(*name))
            .map(|name| name.to_string())
            .collect(),
        has_not: names.contains(&"not"),
        asserts_falsy,
        args,
    })
}
