//! Source language detection and tree-sitter parsing.
//!
//! This module provides:
//! - `SourceLanguage`: the JavaScript-family dialects a test file can be written in
//! - `parse`: tree-sitter parsing that rejects files containing syntax errors

use std::path::Path;

use tree_sitter::{Language, Parser as TsParser, Tree};

use crate::error::TransformError;

/// A JavaScript-family source dialect with its own tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
}

impl SourceLanguage {
    /// All dialects, in registration order.
    pub const ALL: [SourceLanguage; 3] = [
        SourceLanguage::JavaScript,
        SourceLanguage::TypeScript,
        SourceLanguage::Tsx,
    ];

    /// Determine the dialect from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.file_extensions().contains(&ext))
    }

    /// Determine the dialect from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the language identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
            SourceLanguage::Tsx => "tsx",
        }
    }

    /// File extensions handled by this dialect (without dot).
    pub fn file_extensions(&self) -> &'static [&'static str] {
        match self {
            SourceLanguage::JavaScript => &["js", "jsx", "mjs", "cjs"],
            SourceLanguage::TypeScript => &["ts", "mts", "cts"],
            SourceLanguage::Tsx => &["tsx"],
        }
    }

    /// The tree-sitter grammar for this dialect.
    pub fn grammar(&self) -> Language {
        match self {
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if the extension belongs to any supported dialect.
pub fn is_supported_extension(ext: &str) -> bool {
    SourceLanguage::from_extension(ext).is_some()
}

fn create_parser(language: SourceLanguage) -> Result<TsParser, TransformError> {
    let mut parser = TsParser::new();
    parser.set_language(&language.grammar())?;
    Ok(parser)
}

/// Parse source code into a tree-sitter tree.
///
/// Files that do not parse cleanly are rejected rather than rewritten: the
/// error carries the first line containing an ERROR or MISSING node.
pub fn parse(language: SourceLanguage, source: &str) -> Result<Tree, TransformError> {
    let mut parser = create_parser(language)?;
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or(TransformError::NoTree)?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(TransformError::Syntax {
            line: first_error_line(root),
        });
    }

    Ok(tree)
}

fn first_error_line(root: tree_sitter::Node) -> usize {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        if node.has_error() {
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    root.start_position().row + 1
}
