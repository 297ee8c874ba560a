//! Conversion from a tree-sitter syntax tree into the arena.

use tree_sitter::Node as TsNode;

use super::{NodeId, NodeKind, Tree};

/// Build an arena tree from a parsed tree-sitter tree.
///
/// Extras (comments) never become children: they stay in the gaps between
/// child spans and are reproduced verbatim by the printer. The program node
/// always spans the whole file so leading and trailing trivia round-trip.
pub fn build(parsed: &tree_sitter::Tree, source: &str) -> Tree {
    let mut tree = Tree::empty(source);
    let root = parsed.root_node();

    let body = named_children(root)
        .into_iter()
        .map(|child| convert(&mut tree, child, source))
        .collect();
    tree.root = tree.push_parsed(NodeKind::Program(body), root.kind(), 0..source.len());
    tree
}

fn named_children(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn text<'a>(node: TsNode<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

fn convert(tree: &mut Tree, node: TsNode<'_>, source: &str) -> NodeId {
    let kind = match node.kind() {
        "expression_statement" => match named_children(node).as_slice() {
            [expr] => Some(NodeKind::ExpressionStatement(convert(tree, *expr, source))),
            _ => None,
        },
        "lexical_declaration" | "variable_declaration" => declaration(tree, node, source),
        "variable_declarator" => declarator(tree, node, source),
        "assignment_expression" => {
            match (node.child_by_field_name("left"), node.child_by_field_name("right")) {
                (Some(left), Some(right)) => Some(NodeKind::Assignment {
                    left: convert(tree, left, source),
                    right: convert(tree, right, source),
                }),
                _ => None,
            }
        }
        "call_expression" => call(tree, node, source),
        "member_expression" => {
            match (node.child_by_field_name("object"), node.child_by_field_name("property")) {
                (Some(object), Some(property)) => Some(NodeKind::Member {
                    object: convert(tree, object, source),
                    property: convert(tree, property, source),
                }),
                _ => None,
            }
        }
        "identifier"
        | "property_identifier"
        | "private_property_identifier"
        | "shorthand_property_identifier"
        | "shorthand_property_identifier_pattern" => {
            Some(NodeKind::Identifier(text(node, source).to_string()))
        }
        "string" => {
            let raw = text(node, source);
            let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { "" };
            Some(NodeKind::Str(inner.to_string()))
        }
        "number" => Some(NodeKind::Number(text(node, source).to_string())),
        "true" => Some(NodeKind::Bool(true)),
        "false" => Some(NodeKind::Bool(false)),
        _ => None,
    };

    let kind = match kind {
        Some(kind) => kind,
        None => {
            let children = named_children(node)
                .into_iter()
                .map(|child| convert(tree, child, source))
                .collect();
            NodeKind::Opaque(children)
        }
    };

    tree.push_parsed(kind, node.kind(), node.byte_range())
}

fn declaration(tree: &mut Tree, node: TsNode<'_>, source: &str) -> Option<NodeKind> {
    let keyword = node.child(0).map(|k| text(k, source).to_string())?;
    let children = named_children(node);
    if children.is_empty() || children.iter().any(|c| c.kind() != "variable_declarator") {
        return None;
    }
    let declarators = children
        .into_iter()
        .map(|child| convert(tree, child, source))
        .collect();
    Some(NodeKind::VariableDeclaration {
        keyword,
        declarators,
    })
}

fn declarator(tree: &mut Tree, node: TsNode<'_>, source: &str) -> Option<NodeKind> {
    let name = node.child_by_field_name("name")?;
    let value = node.child_by_field_name("value");
    // Type annotations and definite-assignment markers stay in the gaps.
    let name = convert(tree, name, source);
    let init = value.map(|v| convert(tree, v, source));
    Some(NodeKind::VariableDeclarator { name, init })
}

fn call(tree: &mut Tree, node: TsNode<'_>, source: &str) -> Option<NodeKind> {
    let function = node.child_by_field_name("function")?;
    let arguments = node.child_by_field_name("arguments")?;
    // Tagged templates carry a template string instead of an argument list.
    if arguments.kind() != "arguments" {
        return None;
    }
    let callee = convert(tree, function, source);
    let arguments = named_children(arguments)
        .into_iter()
        .map(|arg| convert(tree, arg, source))
        .collect();
    Some(NodeKind::Call { callee, arguments })
}
