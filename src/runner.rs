//! Migration runner: file discovery and parallel transformation.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::TransformError;
use crate::parser;
use crate::transform::Transformer;

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// At least one rewrite changed the file.
    Migrated,
    /// The pipeline ran but nothing matched.
    Unchanged,
    /// No gating import, or not a supported source file.
    Skipped,
    Failed,
}

/// Result for a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub rewrites: BTreeMap<&'static str, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Transformed text, kept for `--stdout`.
    #[serde(skip)]
    pub output: Option<String>,
}

impl FileResult {
    fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            rewrites: BTreeMap::new(),
            warnings: Vec::new(),
            error: None,
            output: None,
        }
    }

    fn failed(path: &Path, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(path, FileStatus::Failed)
        }
    }

    pub fn total_rewrites(&self) -> usize {
        self.rewrites.values().sum()
    }
}

/// Results for a whole run, sorted by path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub dry_run: bool,
    pub files: Vec<FileResult>,
}

impl RunResult {
    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(FileStatus::Failed) > 0
    }

    pub fn total_rewrites(&self) -> usize {
        self.files.iter().map(FileResult::total_rewrites).sum()
    }
}

/// Discovers source files and migrates them.
pub struct Runner {
    config: Config,
    dry_run: bool,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Set whether to leave files on disk untouched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set whether to run the rules in files without a gating import.
    pub fn skip_import_detection(mut self, skip: bool) -> Self {
        self.config.transform.skip_import_detection = skip;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Expand files and directories into the list of source files to migrate.
    pub fn collect_files(&self, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in paths {
            if root.is_file() {
                if !self.config.is_path_excluded(root) {
                    files.push(root.clone());
                }
                continue;
            }

            for entry in WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| {
                    let name = e.file_name().to_string_lossy();
                    // Skip hidden directories (but not the root itself)
                    if e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.') {
                        return false;
                    }
                    !(e.file_type().is_dir() && name == "node_modules")
                })
            {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                if parser::is_supported_extension(ext) && !self.config.is_path_excluded(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Transform every file in parallel, one file per task.
    pub fn run(&self, files: &[PathBuf]) -> RunResult {
        let transformer = Transformer::new(self.config.transform.clone());

        let mut results: Vec<FileResult> = files
            .par_iter()
            .map(|path| self.process(&transformer, path))
            .collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));

        let run = RunResult {
            dry_run: self.dry_run,
            files: results,
        };
        info!(
            files = run.files.len(),
            migrated = run.count(FileStatus::Migrated),
            skipped = run.count(FileStatus::Skipped),
            failed = run.count(FileStatus::Failed),
            rewrites = run.total_rewrites(),
            "migration finished"
        );
        run
    }

    fn process(&self, transformer: &Transformer, path: &Path) -> FileResult {
        let outcome = match transformer.transform_file(path) {
            Ok(outcome) => outcome,
            Err(TransformError::UnsupportedExtension(ext)) => {
                debug!(path = %path.display(), ext = %ext, "skipping unsupported file");
                return FileResult::new(path, FileStatus::Skipped);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to transform file");
                return FileResult::failed(path, e);
            }
        };

        if outcome.gated {
            warn!(path = %path.display(), "no sinon import found, skipping");
            return FileResult {
                warnings: outcome.warnings,
                ..FileResult::new(path, FileStatus::Skipped)
            };
        }

        let status = if outcome.changed {
            FileStatus::Migrated
        } else {
            FileStatus::Unchanged
        };

        if outcome.changed && !self.dry_run {
            if let Err(e) = std::fs::write(path, &outcome.output) {
                warn!(path = %path.display(), error = %e, "failed to write file");
                return FileResult::failed(path, e);
            }
        }
        debug!(path = %path.display(), rewrites = outcome.total_rewrites(), ?status, "processed file");

        FileResult {
            path: path.to_path_buf(),
            status,
            rewrites: outcome.rewrites,
            warnings: outcome.warnings,
            error: None,
            output: Some(outcome.output),
        }
    }
}
