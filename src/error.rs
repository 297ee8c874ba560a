//! Error types for the transformation library.

use thiserror::Error;

/// Errors that can occur while transforming a single source file.
///
/// Rule mismatches are never errors: a rule that does not recognize a call
/// site simply leaves it alone. These variants cover the cases where the
/// file cannot be handled at all.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("parser produced no tree")]
    NoTree,
    #[error("syntax error at line {line}")]
    Syntax { line: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
