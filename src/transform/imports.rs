//! Gating import detection and removal.

use once_cell::sync::OnceCell;
use std::ops::Range;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};

use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::parser::SourceLanguage;
use crate::tree::{NodeKind, Tree};

/// Default imports: `import sinon from 'sinon'`, `import sinon, { match } from 'sinon'`.
const DEFAULT_IMPORT_QUERY: &str = r#"
(import_statement
  (import_clause (identifier) @binding)
  source: (string) @source) @import
"#;

static JAVASCRIPT_QUERY: OnceCell<Query> = OnceCell::new();
static TYPESCRIPT_QUERY: OnceCell<Query> = OnceCell::new();
static TSX_QUERY: OnceCell<Query> = OnceCell::new();

fn default_import_query(language: SourceLanguage) -> Result<&'static Query, TransformError> {
    let cell = match language {
        SourceLanguage::JavaScript => &JAVASCRIPT_QUERY,
        SourceLanguage::TypeScript => &TYPESCRIPT_QUERY,
        SourceLanguage::Tsx => &TSX_QUERY,
    };
    cell.get_or_try_init(|| Ok(Query::new(&language.grammar(), DEFAULT_IMPORT_QUERY)?))
}

/// A top-level default import of the legacy mocking module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatingImport {
    /// Local name the module is bound to.
    pub binding: String,
    /// Module specifier without quotes.
    pub source: String,
    /// Byte range of the whole import statement.
    pub range: Range<usize>,
    /// Named or namespace specifiers that share the statement, e.g. `{ match }`.
    pub rest: Option<String>,
}

impl GatingImport {
    /// Text of the statement once the default specifier is dropped, if
    /// anything is left to import.
    pub fn remainder(&self) -> Option<String> {
        self.rest
            .as_ref()
            .map(|rest| format!("import {} from '{}';", rest, self.source))
    }
}

/// Find the first top-level default import from one of the configured sources.
pub fn find_gating_import(
    parsed: &tree_sitter::Tree,
    source: &str,
    language: SourceLanguage,
    options: &TransformOptions,
) -> Result<Option<GatingImport>, TransformError> {
    let query = default_import_query(language)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, parsed.root_node(), source.as_bytes());

    while let Some(m) = matches.next() {
        let mut binding = None;
        let mut specifier = None;
        let mut statement = None;

        for capture in m.captures {
            match query.capture_names()[capture.index as usize] {
                "binding" => binding = Some(capture.node),
                "source" => specifier = Some(capture.node),
                "import" => statement = Some(capture.node),
                _ => {}
            }
        }

        let (Some(binding), Some(specifier), Some(statement)) = (binding, specifier, statement)
        else {
            continue;
        };
        if statement.parent().map(|p| p.kind()) != Some("program") {
            continue;
        }
        let module = source[specifier.byte_range()].trim_matches(|c| c == '"' || c == '\'');
        if !options.is_import_source(module) {
            continue;
        }

        let rest = binding.parent().and_then(|clause| {
            let mut walker = clause.walk();
            let others: Vec<&str> = clause
                .named_children(&mut walker)
                .filter(|child| child.id() != binding.id() && !child.is_extra())
                .map(|child| &source[child.byte_range()])
                .collect();
            (!others.is_empty()).then(|| others.join(", "))
        });

        return Ok(Some(GatingImport {
            binding: source[binding.byte_range()].to_string(),
            source: module.to_string(),
            range: statement.byte_range(),
            rest,
        }));
    }

    Ok(None)
}

/// Drop the gating import from the arena tree. Returns false when the
/// statement could not be located.
pub fn remove_gating_import(tree: &mut Tree, import: &GatingImport) -> bool {
    let root = tree.root();
    let Some(statement) = tree
        .children(root)
        .into_iter()
        .find(|&id| tree.node(id).span().as_ref() == Some(&import.range))
    else {
        return false;
    };
    match import.remainder() {
        Some(text) => {
            let replacement = tree.alloc(NodeKind::Raw(text));
            tree.replace(statement, replacement);
        }
        None => tree.remove(statement),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::tree;

    fn find(source: &str) -> Option<GatingImport> {
        let parsed = parser::parse(SourceLanguage::JavaScript, source).unwrap();
        find_gating_import(
            &parsed,
            source,
            SourceLanguage::JavaScript,
            &TransformOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_finds_default_import() {
        let import = find("import foo from 'foo'\nimport sandbox from \"sinon-sandbox\";\n").unwrap();
        assert_eq!(import.binding, "sandbox");
        assert_eq!(import.source, "sinon-sandbox");
        assert!(import.rest.is_none());
    }

    #[test]
    fn test_ignores_other_modules_and_named_only_imports() {
        assert!(find("import foo from 'foo'\n").is_none());
        assert!(find("import { stub } from 'sinon'\n").is_none());
        assert!(find("import * as sinon from 'sinon'\n").is_none());
    }

    #[test]
    fn test_keeps_named_specifiers() {
        let source = "import sinon, { match } from 'sinon'\nfoo()\n";
        let import = find(source).unwrap();
        assert_eq!(import.remainder().as_deref(), Some("import { match } from 'sinon';"));

        let parsed = parser::parse(SourceLanguage::JavaScript, source).unwrap();
        let mut arena = tree::build(&parsed, source);
        assert!(remove_gating_import(&mut arena, &import));
        assert_eq!(arena.print(), "import { match } from 'sinon';\nfoo()\n");
    }

    #[test]
    fn test_removes_import_spanning_whole_file() {
        let source = "import sinon from 'sinon'";
        let import = find(source).unwrap();
        let parsed = parser::parse(SourceLanguage::JavaScript, source).unwrap();
        let mut arena = tree::build(&parsed, source);
        assert!(remove_gating_import(&mut arena, &import));
        assert_eq!(arena.print(), "");
    }

    #[test]
    fn test_typescript_import() {
        let source = "import sinon from 'sinon';\nconst a: number = 1;\n";
        let parsed = parser::parse(SourceLanguage::TypeScript, source).unwrap();
        let import = find_gating_import(
            &parsed,
            source,
            SourceLanguage::TypeScript,
            &TransformOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(import.binding, "sinon");
    }
}
