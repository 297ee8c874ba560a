//! Tree printing with byte-exact preservation of untouched regions.

use std::ops::Range;

use super::{NodeId, NodeKind, Tree};

const INDENT_UNIT: &str = "  ";

// Binding strength of expressions, loosest first.
const SEQUENCE: u8 = 1;
const ASSIGNMENT: u8 = 2;
const CONDITIONAL: u8 = 3;
const RELATIONAL: u8 = 10;
const UNARY: u8 = 15;
const POSTFIX: u8 = 16;
const CALL: u8 = 17;
const PRIMARY: u8 = 18;

/// Strength of a binary operator. Unknown text binds loosest so it always
/// gets parenthesized.
fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "??" | "||" => 4,
        "&&" => 5,
        "|" => 6,
        "^" => 7,
        "&" => 8,
        "==" | "!=" | "===" | "!==" => 9,
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => RELATIONAL,
        "<<" | ">>" | ">>>" => 11,
        "+" | "-" => 12,
        "*" | "/" | "%" => 13,
        "**" => 14,
        _ => SEQUENCE,
    }
}

impl Tree {
    /// Print the whole tree back to source text.
    pub fn print(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        self.print_into(self.root, &mut out, "");
        out
    }

    /// Print a single node (used for diagnostics and tests).
    pub fn print_node(&self, id: NodeId) -> String {
        let mut out = String::new();
        let indent = self.nodes[id.0]
            .span
            .as_ref()
            .map(|span| line_indent(&self.source, span.start))
            .unwrap_or("");
        self.print_into(id, &mut out, indent);
        out
    }

    fn print_into(&self, id: NodeId, out: &mut String, indent: &str) {
        let node = &self.nodes[id.0];
        match &node.span {
            Some(span) if !node.dirty => out.push_str(&self.source[span.clone()]),
            Some(span) if !node.reshaped => {
                let indent = line_indent(&self.source, span.start);
                self.splice(id, span.clone(), out, indent);
            }
            Some(span) => {
                let indent = line_indent(&self.source, span.start);
                self.synthesize(id, out, indent);
            }
            None => self.synthesize(id, out, indent),
        }
    }

    /// Re-emit the original text of a node, substituting re-printed children
    /// into their original slots.
    fn splice(&self, id: NodeId, span: Range<usize>, out: &mut String, indent: &str) {
        let node = &self.nodes[id.0];
        if let NodeKind::Identifier(_) | NodeKind::Str(_) | NodeKind::Number(_) | NodeKind::Bool(_) =
            node.kind
        {
            self.synthesize(id, out, indent);
            return;
        }

        let mut cursor = span.start;
        let mut drop_line = false;
        for (child, range) in node.kind.children().into_iter().zip(node.layout.iter()) {
            let mut gap = &self.source[cursor..range.start];
            if drop_line {
                gap = strip_line_remainder(gap);
                drop_line = false;
            }
            if self.nodes[child.0].removed {
                out.push_str(gap.trim_end_matches([' ', '\t']));
                drop_line = true;
            } else {
                out.push_str(gap);
                self.print_into(child, out, indent);
            }
            cursor = range.end;
        }

        let mut tail = &self.source[cursor..span.end];
        if drop_line {
            tail = strip_line_remainder(tail);
        }
        out.push_str(tail);
    }

    /// Canonical printing for synthesized or reshaped nodes.
    fn synthesize(&self, id: NodeId, out: &mut String, indent: &str) {
        match &self.nodes[id.0].kind {
            NodeKind::Program(body) => {
                for (i, statement) in self.live(body).enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    self.print_into(statement, out, indent);
                }
            }
            NodeKind::ExpressionStatement(expr) => {
                self.print_into(*expr, out, indent);
                out.push(';');
            }
            NodeKind::VariableDeclaration {
                keyword,
                declarators,
            } => {
                out.push_str(keyword);
                out.push(' ');
                self.print_list(declarators, out, indent);
                let had_semicolon = self
                    .original_text(id)
                    .map(|text| text.trim_end().ends_with(';'))
                    .unwrap_or(true);
                if had_semicolon {
                    out.push(';');
                }
            }
            NodeKind::VariableDeclarator { name, init } => {
                self.print_into(*name, out, indent);
                if let Some(init) = init {
                    out.push_str(" = ");
                    self.print_into(*init, out, indent);
                }
            }
            NodeKind::Assignment { left, right } => {
                self.print_into(*left, out, indent);
                out.push_str(" = ");
                self.print_into(*right, out, indent);
            }
            NodeKind::Call { callee, arguments } => {
                self.print_operand(*callee, CALL, out, indent);
                out.push('(');
                self.print_list(arguments, out, indent);
                out.push(')');
            }
            NodeKind::Member { object, property } => {
                self.print_operand(*object, CALL, out, indent);
                out.push('.');
                self.print_into(*property, out, indent);
            }
            NodeKind::Index { object, index } => {
                self.print_operand(*object, CALL, out, indent);
                out.push('[');
                self.print_into(*index, out, indent);
                out.push(']');
            }
            NodeKind::Identifier(name) => out.push_str(name),
            NodeKind::Str(value) => {
                out.push('\'');
                for c in value.chars() {
                    if c == '\'' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('\'');
            }
            NodeKind::Number(raw) | NodeKind::Raw(raw) => out.push_str(raw),
            NodeKind::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            NodeKind::Arrow { params, body } => {
                out.push('(');
                self.print_list(params, out, indent);
                out.push_str(") => ");
                self.print_into(*body, out, indent);
            }
            NodeKind::Rest(argument) => {
                out.push_str("...");
                self.print_into(*argument, out, indent);
            }
            NodeKind::Block(body) => {
                let inner = format!("{}{}", indent, INDENT_UNIT);
                out.push_str("{\n");
                for statement in self.live(body) {
                    out.push_str(&inner);
                    self.print_into(statement, out, &inner);
                    out.push('\n');
                }
                out.push_str(indent);
                out.push('}');
            }
            NodeKind::If { test, consequent } => {
                out.push_str("if (");
                self.print_into(*test, out, indent);
                out.push_str(") ");
                self.print_into(*consequent, out, indent);
            }
            NodeKind::Return(argument) => {
                out.push_str("return");
                if let Some(argument) = argument {
                    out.push(' ');
                    self.print_into(*argument, out, indent);
                }
                out.push(';');
            }
            NodeKind::Binary {
                operator,
                left,
                right,
            } => {
                // `**` groups to the right, everything else to the left.
                let strength = binary_precedence(operator);
                let right_assoc = *operator == "**";
                self.print_operand(*left, strength + u8::from(right_assoc), out, indent);
                out.push(' ');
                out.push_str(operator);
                out.push(' ');
                self.print_operand(*right, strength + u8::from(!right_assoc), out, indent);
            }
            NodeKind::Unary { operator, argument } => {
                out.push_str(operator);
                if operator.chars().all(|c| c.is_ascii_alphabetic()) {
                    out.push(' ');
                }
                self.print_operand(*argument, UNARY, out, indent);
            }
            NodeKind::Opaque(_) => {
                // Opaque nodes are only ever created by the builder.
                if let Some(text) = self.original_text(id) {
                    out.push_str(text);
                }
            }
        }
    }

    /// Print `id`, parenthesized when it binds looser than `min`.
    fn print_operand(&self, id: NodeId, min: u8, out: &mut String, indent: &str) {
        if self.precedence(id) < min {
            out.push('(');
            self.print_into(id, out, indent);
            out.push(')');
        } else {
            self.print_into(id, out, indent);
        }
    }

    fn precedence(&self, id: NodeId) -> u8 {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Binary { operator, .. } => binary_precedence(operator),
            NodeKind::Unary { .. } => UNARY,
            NodeKind::Assignment { .. } | NodeKind::Arrow { .. } => ASSIGNMENT,
            NodeKind::Rest(_) => SEQUENCE,
            NodeKind::Opaque(_) => match node.syntax {
                Some("binary_expression") => self
                    .operator_text(id)
                    .map(binary_precedence)
                    .unwrap_or(SEQUENCE),
                Some("ternary_expression") => CONDITIONAL,
                Some(
                    "assignment_expression"
                    | "augmented_assignment_expression"
                    | "arrow_function"
                    | "yield_expression",
                ) => ASSIGNMENT,
                Some("sequence_expression" | "spread_element") => SEQUENCE,
                Some("unary_expression" | "await_expression") => UNARY,
                Some("update_expression" | "non_null_expression") => POSTFIX,
                Some("as_expression" | "satisfies_expression") => RELATIONAL,
                _ => PRIMARY,
            },
            _ => PRIMARY,
        }
    }

    /// Operator of a parsed binary expression: the text between its operands.
    fn operator_text(&self, id: NodeId) -> Option<&str> {
        match self.nodes[id.0].layout.as_slice() {
            [left, right] => self.source.get(left.end..right.start).map(str::trim),
            _ => None,
        }
    }

    fn print_list(&self, items: &[NodeId], out: &mut String, indent: &str) {
        for (i, item) in self.live(items).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.print_into(item, out, indent);
        }
    }

    fn live<'a>(&'a self, items: &'a [NodeId]) -> impl Iterator<Item = NodeId> + 'a {
        items
            .iter()
            .copied()
            .filter(move |item| !self.nodes[item.0].removed)
    }
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(source: &str, pos: usize) -> &str {
    let line_start = source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..pos];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

/// Drop the rest of a removed statement's line: everything up to and
/// including the first newline when only whitespace precedes it.
fn strip_line_remainder(gap: &str) -> &str {
    match gap.find('\n') {
        Some(i) if gap[..i].trim().is_empty() => &gap[i + 1..],
        _ => gap.trim_start_matches([' ', '\t']),
    }
}
