//! Per-file identifier bindings.
//!
//! Computed once before any rewrite pass runs. Passes only query it; the one
//! mutating operation is [`Bindings::remove_declaration`], used when a rewrite
//! leaves a variable without readers.

use std::collections::{HashMap, HashSet};

use super::{NodeId, NodeKind, Tree};

/// Tree-sitter kinds that open a new lexical scope.
const SCOPE_KINDS: &[&str] = &[
    "statement_block",
    "arrow_function",
    "function_expression",
    "function",
    "function_declaration",
    "generator_function",
    "generator_function_declaration",
    "method_definition",
    "for_statement",
    "for_in_statement",
    "catch_clause",
];

/// Function-like kinds whose parameters are declared in their own scope.
const FUNCTION_KINDS: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "function_declaration",
    "generator_function",
    "generator_function_declaration",
    "method_definition",
];

/// Index of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(usize);

/// How a name was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Parameter,
    Function,
    Import,
}

/// A declared name with its declaring scope and resolved reference sites.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Scope node the name is declared in.
    pub scope: NodeId,
    /// The identifier node that declares the name.
    pub declared_at: NodeId,
    /// For variables: the declarator node.
    pub declarator: Option<NodeId>,
    /// Identifier nodes that read or write the binding.
    pub references: Vec<NodeId>,
    pub removed: bool,
}

/// Mapping from identifiers to declaration sites for one file.
#[derive(Debug, Default)]
pub struct Bindings {
    bindings: Vec<Binding>,
    by_scope: HashMap<(NodeId, String), BindingId>,
}

impl Bindings {
    /// Collect every declaration, then resolve every identifier reference to
    /// its nearest enclosing declaration.
    pub fn collect(tree: &Tree) -> Self {
        let mut bindings = Bindings::default();
        let mut declaring: HashSet<NodeId> = HashSet::new();

        for id in tree.descendants(tree.root()) {
            match tree.kind(id) {
                NodeKind::VariableDeclarator { name, .. } => {
                    let scope = enclosing_scope(tree, id);
                    let mut names = Vec::new();
                    pattern_names(tree, *name, &mut names);
                    for ident in names {
                        bindings.declare(tree, ident, scope, BindingKind::Variable, Some(id));
                        declaring.insert(ident);
                    }
                }
                NodeKind::Opaque(children) => {
                    let syntax = tree.syntax(id).unwrap_or("");
                    if FUNCTION_KINDS.contains(&syntax) {
                        for ident in parameter_names(tree, id, children) {
                            bindings.declare(tree, ident, id, BindingKind::Parameter, None);
                            declaring.insert(ident);
                        }
                    }
                    if matches!(
                        syntax,
                        "function_declaration" | "generator_function_declaration" | "class_declaration"
                    ) {
                        if let Some(&name) = children.first() {
                            if tree.syntax(name) == Some("identifier") {
                                let scope = enclosing_scope(tree, id);
                                bindings.declare(tree, name, scope, BindingKind::Function, None);
                                declaring.insert(name);
                            }
                        }
                    }
                    if syntax == "import_clause" {
                        let scope = enclosing_scope(tree, id);
                        let mut names = Vec::new();
                        for &child in children {
                            pattern_names(tree, child, &mut names);
                        }
                        for ident in names {
                            bindings.declare(tree, ident, scope, BindingKind::Import, None);
                            declaring.insert(ident);
                        }
                    }
                }
                _ => {}
            }
        }

        for id in tree.descendants(tree.root()) {
            if declaring.contains(&id) || !is_reference(tree, id) {
                continue;
            }
            let Some(name) = tree.identifier(id) else {
                continue;
            };
            if let Some(binding) = bindings.resolve(tree, id, name) {
                bindings.bindings[binding.0].references.push(id);
            }
        }

        bindings
    }

    fn declare(
        &mut self,
        tree: &Tree,
        ident: NodeId,
        scope: NodeId,
        kind: BindingKind,
        declarator: Option<NodeId>,
    ) {
        let Some(name) = tree.identifier(ident) else {
            return;
        };
        let key = (scope, name.to_string());
        if self.by_scope.contains_key(&key) {
            return;
        }
        let id = BindingId(self.bindings.len());
        self.bindings.push(Binding {
            name: name.to_string(),
            kind,
            scope,
            declared_at: ident,
            declarator,
            references: Vec::new(),
            removed: false,
        });
        self.by_scope.insert(key, id);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0]
    }

    /// Resolve `name` as seen from node `at`.
    pub fn resolve(&self, tree: &Tree, at: NodeId, name: &str) -> Option<BindingId> {
        std::iter::once(at)
            .chain(tree.ancestors(at))
            .filter(|&node| is_scope(tree, node))
            .find_map(|scope| self.by_scope.get(&(scope, name.to_string())).copied())
            .filter(|id| !self.bindings[id.0].removed)
    }

    /// The binding declared by a variable declarator with a plain name.
    pub fn declared_by(&self, declarator: NodeId) -> Option<BindingId> {
        self.bindings
            .iter()
            .position(|b| b.declarator == Some(declarator) && !b.removed)
            .map(BindingId)
    }

    /// References that are still attached and still spell the binding's name.
    pub fn live_references(&self, tree: &Tree, id: BindingId) -> usize {
        let binding = &self.bindings[id.0];
        binding
            .references
            .iter()
            .filter(|&&r| tree.is_attached(r) && tree.is_identifier(r, &binding.name))
            .count()
    }

    /// Remove a variable's declaration from the tree.
    ///
    /// The whole statement goes when the binding is its only declarator;
    /// otherwise just the declarator is dropped. Returns false when the
    /// binding is not a removable variable.
    pub fn remove_declaration(&mut self, tree: &mut Tree, id: BindingId) -> bool {
        let binding = &self.bindings[id.0];
        if binding.removed || binding.kind != BindingKind::Variable {
            return false;
        }
        let Some(declarator) = binding.declarator else {
            return false;
        };
        // Destructuring patterns declare several names at once.
        let NodeKind::VariableDeclarator { name, .. } = tree.kind(declarator) else {
            return false;
        };
        if *name != binding.declared_at {
            return false;
        }
        let Some(declaration) = tree.parent(declarator) else {
            return false;
        };
        let NodeKind::VariableDeclaration {
            keyword,
            declarators,
        } = tree.kind(declaration).clone()
        else {
            return false;
        };

        if declarators.len() == 1 {
            let in_statement_list = tree.parent(declaration).is_some_and(|p| {
                tree.kind(p).is_statement_list()
                    || matches!(
                        tree.syntax(p),
                        Some("statement_block" | "switch_case" | "switch_default")
                    )
            });
            if !in_statement_list {
                return false;
            }
            tree.remove(declaration);
        } else {
            let remaining = declarators.into_iter().filter(|&d| d != declarator).collect();
            tree.set_kind(
                declaration,
                NodeKind::VariableDeclaration {
                    keyword,
                    declarators: remaining,
                },
            );
        }

        self.bindings[id.0].removed = true;
        true
    }
}

fn is_scope(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.kind(id), NodeKind::Program(_))
        || tree
            .syntax(id)
            .is_some_and(|syntax| SCOPE_KINDS.contains(&syntax))
}

fn enclosing_scope(tree: &Tree, id: NodeId) -> NodeId {
    tree.ancestors(id)
        .find(|&node| is_scope(tree, node))
        .unwrap_or(tree.root())
}

/// Whether an identifier node reads or writes a variable.
fn is_reference(tree: &Tree, id: NodeId) -> bool {
    matches!(
        tree.syntax(id),
        Some("identifier" | "shorthand_property_identifier")
    )
}

/// Names introduced by a binding pattern.
fn pattern_names(tree: &Tree, id: NodeId, out: &mut Vec<NodeId>) {
    match tree.syntax(id) {
        Some("identifier" | "shorthand_property_identifier_pattern") => out.push(id),
        Some("assignment_pattern" | "required_parameter" | "optional_parameter") => {
            if let Some(&target) = tree.children(id).first() {
                pattern_names(tree, target, out);
            }
        }
        Some("pair_pattern") => {
            if let Some(&value) = tree.children(id).last() {
                pattern_names(tree, value, out);
            }
        }
        Some("object_pattern" | "array_pattern" | "rest_pattern" | "object_assignment_pattern") => {
            for child in tree.children(id) {
                pattern_names(tree, child, out);
            }
        }
        _ => {}
    }
}

fn parameter_names(tree: &Tree, function: NodeId, children: &[NodeId]) -> Vec<NodeId> {
    let mut names = Vec::new();
    for &child in children {
        match tree.syntax(child) {
            // `x => ...`
            Some("identifier") if tree.syntax(function) == Some("arrow_function") => {
                names.push(child);
                break;
            }
            Some("formal_parameters") => {
                for param in tree.children(child) {
                    pattern_names(tree, param, &mut names);
                }
                break;
            }
            _ => {}
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{self, SourceLanguage};
    use crate::tree::build;

    fn tree_of(source: &str) -> Tree {
        let parsed = parser::parse(SourceLanguage::JavaScript, source).unwrap();
        build(&parsed, source)
    }

    fn find_identifier(tree: &Tree, name: &str, nth: usize) -> NodeId {
        tree.descendants(tree.root())
            .into_iter()
            .filter(|&id| tree.syntax(id) == Some("identifier") && tree.is_identifier(id, name))
            .nth(nth)
            .unwrap()
    }

    #[test]
    fn test_collects_declarations_and_references() {
        let tree = tree_of("let clock\nbeforeEach(() => { clock = make() })\nuse(clock)\n");
        let bindings = Bindings::collect(&tree);
        let usage = find_identifier(&tree, "clock", 2);
        let id = bindings.resolve(&tree, usage, "clock").unwrap();
        let binding = bindings.get(id);
        assert_eq!(binding.kind, BindingKind::Variable);
        assert_eq!(binding.scope, tree.root());
        assert_eq!(binding.references.len(), 2);
        assert_eq!(bindings.live_references(&tree, id), 2);
    }

    #[test]
    fn test_parameters_shadow_outer_bindings() {
        let tree = tree_of("const a = 1\nfunction f(a) { return a }\n");
        let bindings = Bindings::collect(&tree);
        let inner = find_identifier(&tree, "a", 2);
        let id = bindings.resolve(&tree, inner, "a").unwrap();
        assert_eq!(bindings.get(id).kind, BindingKind::Parameter);

        let outer = bindings.resolve(&tree, tree.root(), "a").unwrap();
        assert_eq!(bindings.get(outer).kind, BindingKind::Variable);
        assert!(bindings.get(outer).references.is_empty());
    }

    #[test]
    fn test_remove_declaration_whole_statement() {
        let mut tree = tree_of("let clock1\nfoo()\n");
        let mut bindings = Bindings::collect(&tree);
        let id = bindings.resolve(&tree, tree.root(), "clock1").unwrap();
        assert!(bindings.remove_declaration(&mut tree, id));
        assert_eq!(tree.print(), "foo()\n");
        assert!(bindings.resolve(&tree, tree.root(), "clock1").is_none());
        assert!(!bindings.remove_declaration(&mut tree, id));
    }

    #[test]
    fn test_remove_declaration_keeps_siblings() {
        let mut tree = tree_of("let a = 1, clock;\n");
        let mut bindings = Bindings::collect(&tree);
        let id = bindings.resolve(&tree, tree.root(), "clock").unwrap();
        assert!(bindings.remove_declaration(&mut tree, id));
        assert_eq!(tree.print(), "let a = 1;\n");
    }

    #[test]
    fn test_destructured_names_are_not_removed() {
        let mut tree = tree_of("const { a, b } = obj\n");
        let mut bindings = Bindings::collect(&tree);
        let id = bindings.resolve(&tree, tree.root(), "a").unwrap();
        assert!(!bindings.remove_declaration(&mut tree, id));
    }
}
