//! Command-line interface for mockshift.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config, CONFIG_TEMPLATE, DEFAULT_CONFIG_NAMES};
use crate::report;
use crate::runner::Runner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Migrate sinon stubs, spies and assertions to jest.
///
/// Files are rewritten in place. Only files with a default import of
/// sinon are touched; everything a rule does not recognize is left as is.
#[derive(Parser)]
#[command(name = "mockshift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log rule applications to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate files or directories
    #[command(visible_alias = "migrate")]
    Run(RunArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Files or directories to migrate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report what would change without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Run the rules even in files without a sinon import
    #[arg(long)]
    pub skip_import_detection: bool,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Print transformed sources instead of writing them (implies --dry-run)
    #[arg(long)]
    pub stdout: bool,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "mockshift.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Load the configuration: explicit path, else auto-discovered, else defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Config::discover(Path::new(".")),
    };
    let config = match &path {
        Some(path) => Config::parse_file(path)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?,
        None => Config::default(),
    };
    config::validate(&config)?;
    Ok((config, path))
}

/// Run the migration command.
pub fn run_migrate(args: &RunArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    for path in &args.paths {
        if !path.exists() {
            eprintln!("Error: cannot access path {:?}", path);
            return Ok(EXIT_ERROR);
        }
    }

    let runner = Runner::new(config)
        .dry_run(args.dry_run || args.stdout)
        .skip_import_detection(args.skip_import_detection);

    let files = runner.collect_files(&args.paths)?;
    if files.is_empty() {
        eprintln!("Warning: no files to migrate");
        return Ok(EXIT_SUCCESS);
    }

    let result = runner.run(&files);

    if args.stdout {
        for file in &result.files {
            if let Some(output) = &file.output {
                print!("{}", output);
            }
        }
    } else {
        let base = match args.paths.as_slice() {
            [single] => single.clone(),
            _ => PathBuf::new(),
        };
        match args.format.as_str() {
            "json" => report::write_json(&base, &result)?,
            _ => report::write_pretty(&base, &result),
        }
    }

    if result.has_failures() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it or --output to pick another path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your project", args.output.display());
    if !DEFAULT_CONFIG_NAMES.iter().any(|name| args.output.ends_with(name)) {
        println!(
            "  2. Run: mockshift run . --config {}",
            args.output.display()
        );
    } else {
        println!("  2. Run: mockshift run .");
    }

    Ok(EXIT_SUCCESS)
}
