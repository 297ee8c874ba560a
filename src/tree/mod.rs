//! Arena-backed mutable source tree.
//!
//! Rewrite rules operate on a [`Tree`]: a flat arena of [`Node`]s addressed by
//! [`NodeId`], each carrying its parent index for ancestor walks. Node shapes
//! form the closed [`NodeKind`] enumeration; tree-sitter nodes without a typed
//! variant are kept as [`NodeKind::Opaque`] and always print from source.
//!
//! # Round-tripping
//!
//! Parsed nodes remember their byte span and the spans of their children
//! (the *layout*). The printer emits clean nodes verbatim, splices re-printed
//! children into the original text for dirty nodes whose shape is unchanged,
//! and falls back to canonical printing only for synthesized or reshaped
//! nodes. See `print.rs`.

mod bindings;
mod build;
mod print;

pub use bindings::{Binding, BindingId, BindingKind, Bindings};
pub use build::build;

use std::ops::Range;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node shapes understood by the rewrite rules.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program(Vec<NodeId>),
    ExpressionStatement(NodeId),
    VariableDeclaration {
        keyword: String,
        declarators: Vec<NodeId>,
    },
    VariableDeclarator {
        name: NodeId,
        init: Option<NodeId>,
    },
    Assignment {
        left: NodeId,
        right: NodeId,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Member {
        object: NodeId,
        property: NodeId,
    },
    Index {
        object: NodeId,
        index: NodeId,
    },
    Identifier(String),
    /// String literal; the payload is the text between the quotes.
    Str(String),
    Number(String),
    Bool(bool),
    Arrow {
        params: Vec<NodeId>,
        body: NodeId,
    },
    Rest(NodeId),
    Block(Vec<NodeId>),
    If {
        test: NodeId,
        consequent: NodeId,
    },
    Return(Option<NodeId>),
    Binary {
        operator: &'static str,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        operator: &'static str,
        argument: NodeId,
    },
    /// Verbatim text fragment.
    Raw(String),
    /// Any parsed construct without a typed variant.
    Opaque(Vec<NodeId>),
}

impl NodeKind {
    /// Child slots in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program(body) | NodeKind::Block(body) | NodeKind::Opaque(body) => {
                body.clone()
            }
            NodeKind::ExpressionStatement(expr) => vec![*expr],
            NodeKind::VariableDeclaration { declarators, .. } => declarators.clone(),
            NodeKind::VariableDeclarator { name, init } => {
                let mut out = vec![*name];
                out.extend(init.iter().copied());
                out
            }
            NodeKind::Assignment { left, right } => vec![*left, *right],
            NodeKind::Call { callee, arguments } => {
                let mut out = Vec::with_capacity(arguments.len() + 1);
                out.push(*callee);
                out.extend(arguments.iter().copied());
                out
            }
            NodeKind::Member { object, property } => vec![*object, *property],
            NodeKind::Index { object, index } => vec![*object, *index],
            NodeKind::Arrow { params, body } => {
                let mut out = params.clone();
                out.push(*body);
                out
            }
            NodeKind::Rest(arg) => vec![*arg],
            NodeKind::If { test, consequent } => vec![*test, *consequent],
            NodeKind::Return(arg) => arg.iter().copied().collect(),
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Unary { argument, .. } => vec![*argument],
            NodeKind::Identifier(_)
            | NodeKind::Str(_)
            | NodeKind::Number(_)
            | NodeKind::Bool(_)
            | NodeKind::Raw(_) => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            NodeKind::Program(body) | NodeKind::Block(body) | NodeKind::Opaque(body) => {
                body.iter_mut().collect()
            }
            NodeKind::ExpressionStatement(expr) => vec![expr],
            NodeKind::VariableDeclaration { declarators, .. } => declarators.iter_mut().collect(),
            NodeKind::VariableDeclarator { name, init } => {
                let mut out = vec![name];
                out.extend(init.iter_mut());
                out
            }
            NodeKind::Assignment { left, right } => vec![left, right],
            NodeKind::Call { callee, arguments } => {
                let mut out = vec![callee];
                out.extend(arguments.iter_mut());
                out
            }
            NodeKind::Member { object, property } => vec![object, property],
            NodeKind::Index { object, index } => vec![object, index],
            NodeKind::Arrow { params, body } => {
                let mut out: Vec<&mut NodeId> = params.iter_mut().collect();
                out.push(body);
                out
            }
            NodeKind::Rest(arg) => vec![arg],
            NodeKind::If { test, consequent } => vec![test, consequent],
            NodeKind::Return(arg) => arg.iter_mut().collect(),
            NodeKind::Binary { left, right, .. } => vec![left, right],
            NodeKind::Unary { argument, .. } => vec![argument],
            NodeKind::Identifier(_)
            | NodeKind::Str(_)
            | NodeKind::Number(_)
            | NodeKind::Bool(_)
            | NodeKind::Raw(_) => Vec::new(),
        }
    }

    /// Whether this kind lists statements (removal keeps the list well-formed).
    pub fn is_statement_list(&self) -> bool {
        matches!(self, NodeKind::Program(_) | NodeKind::Block(_))
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Tree-sitter kind name for parsed nodes; `None` for synthesized ones.
    pub syntax: Option<&'static str>,
    span: Option<Range<usize>>,
    layout: Vec<Range<usize>>,
    dirty: bool,
    reshaped: bool,
    removed: bool,
}

impl Node {
    /// Byte range in the original source, if parsed.
    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }

    pub fn is_synthesized(&self) -> bool {
        self.span.is_none()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Mutable source tree for one file.
pub struct Tree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    fn empty(source: &str) -> Self {
        Self {
            source: source.to_string(),
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    /// A tree with no source, for building fragments in tests.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self::empty("")
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn syntax(&self, id: NodeId) -> Option<&'static str> {
        self.nodes[id.0].syntax
    }

    /// Live children in source order (removed statements excluded).
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id)
            .children()
            .into_iter()
            .filter(|c| !self.nodes[c.0].removed)
            .collect()
    }

    /// Iterate over the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// All live nodes below `id` (inclusive) in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.nodes[current.0].removed {
                continue;
            }
            out.push(current);
            let children = self.kind(current).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Original source text of a parsed node.
    pub fn original_text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0]
            .span
            .as_ref()
            .map(|span| &self.source[span.clone()])
    }

    /// Whether the node is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if self.nodes[current.0].removed {
                return false;
            }
            if current == self.root {
                return true;
            }
            let Some(parent) = self.parent(current) else {
                return false;
            };
            if !self.kind(parent).children().contains(&current) {
                return false;
            }
            current = parent;
        }
    }

    // ------------------------------------------------------------------
    // Shape queries used by rule predicates
    // ------------------------------------------------------------------

    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_identifier(&self, id: NodeId, name: &str) -> bool {
        self.identifier(id) == Some(name)
    }

    pub fn call(&self, id: NodeId) -> Option<(NodeId, &[NodeId])> {
        match self.kind(id) {
            NodeKind::Call { callee, arguments } => Some((*callee, arguments)),
            _ => None,
        }
    }

    pub fn member(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.kind(id) {
            NodeKind::Member { object, property } => Some((*object, *property)),
            _ => None,
        }
    }

    /// Property name of a member expression.
    pub fn member_name(&self, id: NodeId) -> Option<&str> {
        self.member(id).and_then(|(_, property)| self.identifier(property))
    }

    /// Decompose `object.name(args)`.
    pub fn method_call(&self, id: NodeId) -> Option<MethodCall<'_>> {
        let (callee, args) = self.call(id)?;
        let (object, property) = self.member(callee)?;
        let name = self.identifier(property)?;
        Some(MethodCall {
            callee,
            object,
            property,
            name,
            args,
        })
    }

    /// Whether `id` is the callee of its parent call.
    pub fn is_callee(&self, id: NodeId) -> bool {
        self.parent(id)
            .and_then(|p| self.call(p))
            .is_some_and(|(callee, _)| callee == id)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Allocate a synthesized node, adopting its children.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in kind.children() {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            parent: None,
            syntax: None,
            span: None,
            layout: Vec::new(),
            dirty: true,
            reshaped: false,
            removed: false,
        });
        id
    }

    pub(crate) fn push_parsed(
        &mut self,
        kind: NodeKind,
        syntax: &'static str,
        span: Range<usize>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let children = kind.children();
        let layout = children
            .iter()
            .map(|c| self.nodes[c.0].span.clone().unwrap_or(span.start..span.start))
            .collect();
        for child in children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            parent: None,
            syntax: Some(syntax),
            span: Some(span),
            layout,
            dirty: false,
            reshaped: false,
            removed: false,
        });
        id
    }

    /// Put `new` in the slot `old` occupies in its parent.
    ///
    /// `new` may contain `old`'s descendants; use [`Tree::wrap`] when it
    /// contains `old` itself.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        self.replace_in(parent, old, new);
    }

    fn replace_in(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let mut found = false;
        for slot in self.nodes[parent.0].kind.children_mut() {
            if *slot == old {
                *slot = new;
                found = true;
                break;
            }
        }
        debug_assert!(found, "replace target is not a child of its parent");
        if found {
            self.nodes[new.0].parent = Some(parent);
            self.mark_dirty(parent);
        }
    }

    /// Replace `id` with a wrapper built around it.
    pub fn wrap<F>(&mut self, id: NodeId, build: F) -> NodeId
    where
        F: FnOnce(&mut Tree, NodeId) -> NodeId,
    {
        let parent = self.parent(id);
        let wrapper = build(self, id);
        if let Some(parent) = parent {
            self.replace_in(parent, id, wrapper);
        }
        wrapper
    }

    /// Rename an identifier in place.
    pub fn rename(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Identifier(current) = &mut self.nodes[id.0].kind {
            if current != name {
                *current = name.to_string();
                self.mark_dirty(id);
            }
        }
    }

    /// Change a node's payload. A parsed node whose slot count or variant
    /// changes can no longer be printed by splicing and is marked reshaped.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        for child in kind.children() {
            self.nodes[child.0].parent = Some(id);
        }
        let node = &mut self.nodes[id.0];
        let same_variant = std::mem::discriminant(&node.kind) == std::mem::discriminant(&kind);
        if !same_variant || kind.children().len() != node.layout.len() {
            node.reshaped = true;
        }
        node.kind = kind;
        self.mark_dirty(id);
    }

    /// Remove a statement from its enclosing statement list.
    pub fn remove(&mut self, id: NodeId) {
        self.nodes[id.0].removed = true;
        if let Some(parent) = self.parent(id) {
            self.mark_dirty(parent);
        }
    }

    fn mark_dirty(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current {
            self.nodes[node.0].dirty = true;
            current = self.nodes[node.0].parent;
        }
    }
}

/// `object.name(args)` decomposed.
#[derive(Debug, Clone, Copy)]
pub struct MethodCall<'a> {
    pub callee: NodeId,
    pub object: NodeId,
    pub property: NodeId,
    pub name: &'a str,
    pub args: &'a [NodeId],
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
