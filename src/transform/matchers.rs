//! Argument matchers: `sinon.match(...)` and `sinon.match.<token>`.

use phf::phf_map;

use super::{candidates, synth, PassContext};
use crate::tree::{NodeId, Tree};

const RULE: &str = "matchers";

/// Declarative type-tag tokens read off `sinon.match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherToken {
    Array,
    Function,
    Number,
    Object,
    String,
    /// Matches any value; also used for unrecognized tokens.
    Any,
}

static TOKENS: phf::Map<&'static str, MatcherToken> = phf_map! {
    "array" => MatcherToken::Array,
    "func" => MatcherToken::Function,
    "number" => MatcherToken::Number,
    "object" => MatcherToken::Object,
    "string" => MatcherToken::String,
};

impl MatcherToken {
    /// Map a `sinon.match.<token>` property name. Unknown names match anything.
    pub fn from_token(token: &str) -> Self {
        TOKENS.get(token).copied().unwrap_or(MatcherToken::Any)
    }

    /// Constructor passed to `expect.any`.
    pub fn constructor(self) -> Option<&'static str> {
        match self {
            MatcherToken::Array => Some("Array"),
            MatcherToken::Function => Some("Function"),
            MatcherToken::Number => Some("Number"),
            MatcherToken::Object => Some("Object"),
            MatcherToken::String => Some("String"),
            MatcherToken::Any => None,
        }
    }

    /// Result of `typeof` for values of this type.
    pub fn runtime_tag(self) -> Option<&'static str> {
        match self {
            MatcherToken::Array | MatcherToken::Object => Some("object"),
            MatcherToken::Function => Some("function"),
            MatcherToken::Number => Some("number"),
            MatcherToken::String => Some("string"),
            MatcherToken::Any => None,
        }
    }
}

/// The token of a `<bound>.match.<token>` member expression.
pub fn matcher_token(tree: &Tree, ctx: &PassContext<'_>, id: NodeId) -> Option<MatcherToken> {
    let (object, _) = tree.member(id)?;
    let (namespace, _) = tree.member(object)?;
    if !ctx.is_binding(tree, namespace) || tree.member_name(object) != Some("match") {
        return None;
    }
    tree.member_name(id).map(MatcherToken::from_token)
}

fn is_object_matcher(tree: &Tree, ctx: &PassContext<'_>, id: NodeId) -> bool {
    tree.method_call(id)
        .is_some_and(|mc| mc.name == "match" && ctx.is_binding(tree, mc.object))
}

/// An uncalled token access that is not itself the receiver of another member.
fn is_token_matcher(tree: &Tree, ctx: &PassContext<'_>, id: NodeId) -> bool {
    if matcher_token(tree, ctx, id).is_none() || tree.is_callee(id) {
        return false;
    }
    !tree
        .parent(id)
        .and_then(|parent| tree.member(parent))
        .is_some_and(|(object, _)| object == id)
}

pub fn run(tree: &mut Tree, ctx: &mut PassContext<'_>) {
    let found = candidates(tree, |t, id| {
        is_object_matcher(t, ctx, id) || is_token_matcher(t, ctx, id)
    });
    for id in found {
        if !tree.is_attached(id) {
            continue;
        }
        if let Some((callee, _)) = tree.call(id) {
            // Nested matchers inside the object literal are visited on their own.
            let replacement = synth::qualified(tree, synth::EXPECT, "objectContaining");
            tree.replace(callee, replacement);
        } else if let Some(token) = matcher_token(tree, ctx, id) {
            let replacement = match token.constructor() {
                Some(constructor) => {
                    let callee = synth::qualified(tree, synth::EXPECT, "any");
                    let constructor = synth::ident(tree, constructor);
                    synth::call(tree, callee, vec![constructor])
                }
                None => {
                    let callee = synth::qualified(tree, synth::EXPECT, "anything");
                    synth::call(tree, callee, Vec::new())
                }
            };
            tree.replace(id, replacement);
        } else {
            continue;
        }
        ctx.record(tree, RULE, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_support::run_pass;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_table() {
        assert_eq!(MatcherToken::from_token("func"), MatcherToken::Function);
        assert_eq!(MatcherToken::from_token("regexp"), MatcherToken::Any);
        assert_eq!(MatcherToken::Array.constructor(), Some("Array"));
        assert_eq!(MatcherToken::Array.runtime_tag(), Some("object"));
        assert_eq!(MatcherToken::Function.runtime_tag(), Some("function"));
        assert_eq!(MatcherToken::Any.constructor(), None);
        assert_eq!(MatcherToken::Any.runtime_tag(), None);
    }

    #[test]
    fn test_object_matcher_keeps_formatting() {
        let source = "sinon.match({\n  foo: 'foo'\n})\n";
        assert_eq!(
            run_pass(source, run),
            "expect.objectContaining({\n  foo: 'foo'\n})\n"
        );
    }

    #[test]
    fn test_nested_object_matchers() {
        let source = "sinon.match({ foo: sinon.match({ bar: 'bar' }) })\n";
        assert_eq!(
            run_pass(source, run),
            "expect.objectContaining({ foo: expect.objectContaining({ bar: 'bar' }) })\n"
        );
    }

    #[test]
    fn test_token_matchers() {
        let source = "expect(foo).toEqual(sinon.match.number)\nfoo(sinon.match.string, sinon.match.func)\nfoo(sinon.match.array, sinon.match.object)\nfoo(sinon.match.any)\n";
        assert_eq!(
            run_pass(source, run),
            "expect(foo).toEqual(expect.any(Number))\nfoo(expect.any(String), expect.any(Function))\nfoo(expect.any(Array), expect.any(Object))\nfoo(expect.anything())\n"
        );
    }

    #[test]
    fn test_chained_token_untouched() {
        let source = "foo(sinon.match.number.and(x))\nfoo(other.match.number)\n";
        assert_eq!(run_pass(source, run), source);
    }
}
