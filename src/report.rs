//! Output formatting for migration results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::runner::{FileResult, FileStatus, RunResult};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub dry_run: bool,
    pub summary: JsonSummary,
    /// Rewrites applied across all files, per rule.
    pub rewrites: BTreeMap<&'static str, usize>,
    pub files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub files: usize,
    pub migrated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Serialize)]
pub struct JsonFile<'a> {
    pub path: String,
    pub status: FileStatus,
    pub rewrites: &'a BTreeMap<&'static str, usize>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

/// Build the JSON report for a run.
pub fn json_report<'a>(base_path: &Path, run: &'a RunResult) -> JsonReport<'a> {
    let mut rewrites: BTreeMap<&'static str, usize> = BTreeMap::new();
    for file in &run.files {
        for (rule, count) in &file.rewrites {
            *rewrites.entry(*rule).or_default() += *count;
        }
    }

    JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        dry_run: run.dry_run,
        summary: summary(run),
        rewrites,
        files: run
            .files
            .iter()
            .map(|result| JsonFile {
                path: make_relative_path(&result.path, base_path),
                status: result.status,
                rewrites: &result.rewrites,
                warnings: &result.warnings,
                error: result.error.as_deref(),
            })
            .collect(),
    }
}

fn summary(run: &RunResult) -> JsonSummary {
    JsonSummary {
        files: run.files.len(),
        migrated: run.count(FileStatus::Migrated),
        unchanged: run.count(FileStatus::Unchanged),
        skipped: run.count(FileStatus::Skipped),
        failed: run.count(FileStatus::Failed),
    }
}

/// Write results in JSON format.
pub fn write_json(base_path: &Path, run: &RunResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(base_path, run))?;
    println!("{}", json);
    Ok(())
}

fn make_relative_path(file: &Path, base_path: &Path) -> String {
    if base_path.as_os_str().is_empty() {
        return file.to_string_lossy().to_string();
    }

    // Single file run: just the filename
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.to_string_lossy().to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file.to_string_lossy().to_string())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(base_path: &Path, run: &RunResult) {
    // Header
    println!();
    print!("  ");
    print!("{}", "mockshift".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Path: ".dimmed());
    println!("{}", base_path.display());
    if run.dry_run {
        println!("  {}", "dry run: no files written".dimmed());
    }
    println!();

    let listed: Vec<&FileResult> = run
        .files
        .iter()
        .filter(|f| f.status != FileStatus::Unchanged)
        .collect();
    if !listed.is_empty() {
        println!("  {} ({}):", "Files".bold(), listed.len());
        println!();
        for file in listed {
            write_file(base_path, file);
        }
        println!();
    }

    write_summary(run);
    println!();
}

fn write_file(base_path: &Path, file: &FileResult) {
    write_status_tag(file.status);
    print!("   ");
    print!("{}", make_relative_path(&file.path, base_path).blue());
    if file.total_rewrites() > 0 {
        let rules: Vec<String> = file
            .rewrites
            .iter()
            .map(|(rule, count)| format!("{}×{}", rule, count))
            .collect();
        print!("  {}", rules.join(" ").dimmed());
    }
    println!();

    if let Some(error) = &file.error {
        println!("            {}", error.red());
    }
    for warning in &file.warnings {
        println!("            {}", warning.dimmed());
    }
}

fn write_status_tag(status: FileStatus) {
    match status {
        FileStatus::Migrated => print!("    {} ", "MIGRATED".green()),
        FileStatus::Unchanged => print!("    {} ", "UNCHANGED".dimmed()),
        FileStatus::Skipped => print!("    {} ", "SKIPPED ".yellow()),
        FileStatus::Failed => print!("    {} ", "FAILED  ".red()),
    }
}

fn write_summary(run: &RunResult) {
    let s = summary(run);
    print!("  {} files: ", s.files);
    print!("{} migrated", s.migrated.to_string().green());
    print!(", {} unchanged", s.unchanged);
    print!(", {} skipped", s.skipped.to_string().yellow());
    print!(", {} failed", s.failed.to_string().red());
    println!("  {}", format!("({} rewrites)", run.total_rewrites()).dimmed());

    if s.failed > 0 {
        println!("  {}", "FAILED".red());
    } else {
        println!("  {}", "OK".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(path: &str, status: FileStatus, rewrites: &[(&'static str, usize)]) -> FileResult {
        FileResult {
            path: PathBuf::from(path),
            status,
            rewrites: rewrites.iter().copied().collect(),
            warnings: Vec::new(),
            error: None,
            output: None,
        }
    }

    #[test]
    fn test_relative_paths() {
        let base = Path::new("/repo");
        assert_eq!(make_relative_path(Path::new("/repo/src/a.js"), base), "src/a.js");
        assert_eq!(make_relative_path(Path::new("/repo/a.js"), Path::new("/repo/a.js")), "a.js");
        assert_eq!(make_relative_path(Path::new("/other/a.js"), base), "/other/a.js");
    }

    #[test]
    fn test_json_report_aggregates_rewrites() {
        let run = RunResult {
            dry_run: true,
            files: vec![
                file("/repo/a.js", FileStatus::Migrated, &[("stubs", 2), ("resets", 1)]),
                file("/repo/b.js", FileStatus::Migrated, &[("stubs", 1)]),
                file("/repo/c.js", FileStatus::Skipped, &[]),
            ],
        };
        let report = json_report(Path::new("/repo"), &run);
        assert_eq!(report.rewrites.get("stubs"), Some(&3));
        assert_eq!(report.summary.migrated, 2);
        assert_eq!(report.summary.skipped, 1);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["files"][0]["path"], "a.js");
        assert_eq!(value["files"][2]["status"], "skipped");
        assert_eq!(value["dry_run"], true);
    }
}
