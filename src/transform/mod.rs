//! The rewrite engine.
//!
//! A [`Transformer`] parses one file, checks for the gating import, builds the
//! arena [`Tree`] and runs the fixed [`PIPELINE`] over it. Each pass is a
//! plain function over the tree and a shared [`PassContext`]; passes first
//! collect candidate nodes read-only, then rewrite the ones still attached.
//!
//! Pass order matters: assertion rewrites consume shapes produced by earlier
//! passes (`withArgs(..).called` becomes `calledWith(..)` before the
//! calledWith pass runs), and the timer pass must turn `clock.restore()` into
//! `jest.useRealTimers()` before the reset pass renames every `.restore()`.

mod assertions;
mod imports;
mod matchers;
mod resets;
mod returns;
mod scope;
mod stubs;
mod synth;
mod timers;

pub use assertions::negation;
pub use imports::{find_gating_import, GatingImport};
pub use matchers::MatcherToken;
pub use scope::{in_setup_hook, statement_boundary, Boundary};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::parser::{self, SourceLanguage};
use crate::tree::{self, Bindings, NodeId, Tree};

/// A rewrite pass.
pub type Pass = fn(&mut Tree, &mut PassContext<'_>);

/// Passes in execution order.
pub const PIPELINE: &[(&str, Pass)] = &[
    ("stubs", stubs::run),
    ("timers", timers::run),
    ("returns", returns::run),
    ("resets", resets::run),
    ("call_count", assertions::call_count::run),
    ("called_with", assertions::called_with::run),
    ("matchers", matchers::run),
];

/// State shared by the passes over one file.
pub struct PassContext<'a> {
    /// Local name of the legacy mocking module.
    pub binding: &'a str,
    pub options: &'a TransformOptions,
    pub bindings: Bindings,
    rewrites: BTreeMap<&'static str, usize>,
}

impl<'a> PassContext<'a> {
    pub fn new(binding: &'a str, options: &'a TransformOptions, bindings: Bindings) -> Self {
        Self {
            binding,
            options,
            bindings,
            rewrites: BTreeMap::new(),
        }
    }

    /// Whether `id` is the legacy module's identifier.
    pub fn is_binding(&self, tree: &Tree, id: NodeId) -> bool {
        tree.is_identifier(id, self.binding)
    }

    /// Count an applied rewrite.
    pub fn record(&mut self, tree: &Tree, rule: &'static str, at: NodeId) {
        debug!(rule, line = line_of(tree, at), "applied rewrite");
        *self.rewrites.entry(rule).or_default() += 1;
    }

    pub fn rewrites(&self) -> &BTreeMap<&'static str, usize> {
        &self.rewrites
    }
}

/// 1-based line of a parsed node, or of its nearest parsed ancestor.
fn line_of(tree: &Tree, id: NodeId) -> usize {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .find_map(|node| tree.node(node).span())
        .map(|span| tree.source()[..span.start].matches('\n').count() + 1)
        .unwrap_or(0)
}

/// Live nodes matching `predicate`, in document order.
fn candidates<F>(tree: &Tree, predicate: F) -> Vec<NodeId>
where
    F: Fn(&Tree, NodeId) -> bool,
{
    tree.descendants(tree.root())
        .into_iter()
        .filter(|&id| predicate(tree, id))
        .collect()
}

/// Result of transforming one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformOutcome {
    /// The rewritten source, or the input unchanged.
    pub output: String,
    /// Whether `output` differs from the input.
    pub changed: bool,
    /// True when no gating import was found and the pipeline did not run.
    pub gated: bool,
    /// Binding name the rules matched against.
    pub binding: Option<String>,
    pub warnings: Vec<String>,
    /// Applied rewrites per rule.
    pub rewrites: BTreeMap<&'static str, usize>,
}

impl TransformOutcome {
    pub fn total_rewrites(&self) -> usize {
        self.rewrites.values().sum()
    }
}

fn language_of(path: &Path) -> Result<SourceLanguage, TransformError> {
    SourceLanguage::from_path(path).ok_or_else(|| {
        TransformError::UnsupportedExtension(
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    })
}

/// Rewrites sinon usage in a single file into jest.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Read and transform a file. Unsupported extensions are rejected
    /// before the file is read.
    pub fn transform_file(&self, path: &Path) -> Result<TransformOutcome, TransformError> {
        let language = language_of(path)?;
        let source = std::fs::read_to_string(path)?;
        self.transform(&source, language)
    }

    /// Transform a file, picking the dialect from its extension.
    pub fn transform_path(&self, path: &Path, source: &str) -> Result<TransformOutcome, TransformError> {
        self.transform(source, language_of(path)?)
    }

    /// Transform source text.
    ///
    /// Returns the input unchanged (with `gated` set) when the file has no
    /// gating import and detection is not skipped.
    pub fn transform(
        &self,
        source: &str,
        language: SourceLanguage,
    ) -> Result<TransformOutcome, TransformError> {
        let parsed = parser::parse(language, source)?;
        let import = imports::find_gating_import(&parsed, source, language, &self.options)?;

        let mut warnings = Vec::new();
        let binding = match &import {
            Some(import) => import.binding.clone(),
            None => {
                let message = format!(
                    "no default import from {} found",
                    self.options.import_sources.join(" or ")
                );
                if !self.options.skip_import_detection {
                    debug!(%language, "{}", message);
                    warnings.push(message);
                    return Ok(TransformOutcome {
                        output: source.to_string(),
                        gated: true,
                        warnings,
                        ..TransformOutcome::default()
                    });
                }
                warnings.push(format!(
                    "{}; assuming `{}`",
                    message, self.options.default_binding
                ));
                self.options.default_binding.clone()
            }
        };

        let mut tree = tree::build(&parsed, source);
        let bindings = Bindings::collect(&tree);
        if let Some(import) = &import {
            if !imports::remove_gating_import(&mut tree, import) {
                warnings.push(format!("could not remove import of {}", import.source));
            }
        }

        let mut ctx = PassContext::new(&binding, &self.options, bindings);
        for (name, pass) in PIPELINE {
            debug!(pass = *name, "running pass");
            pass(&mut tree, &mut ctx);
        }

        let output = tree.print();
        let rewrites = ctx.rewrites().clone();
        Ok(TransformOutcome {
            changed: output != source,
            output,
            gated: false,
            binding: Some(binding),
            warnings,
            rewrites,
        })
    }
}
