//! Configuration for a migration run.
//!
//! Configuration is read from YAML. Every field has a default, so an empty
//! file (or no file at all) selects the conventional sinon → jest mapping.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["mockshift.yaml", ".mockshift.yaml"];

/// Commented configuration written by `mockshift init`.
pub const CONFIG_TEMPLATE: &str = r#"# mockshift configuration
#
# Run rules even in files without a sinon default import.
skip_import_detection: false

# Modules whose default import enables the migration (the import is removed).
import_sources:
  - sinon
  - sinon-sandbox

# Binding name assumed when skip_import_detection forces a run.
default_binding: sinon

# Hooks whose spies get `.mockClear()` appended.
setup_hooks:
  - beforeEach

# Receivers whose `.restore()` means "switch back to real timers".
clock_identifiers:
  - clock

# Glob patterns for paths to leave alone.
excluded_paths:
  - "**/node_modules/**"
"#;

/// Options that steer a single-file transformation.
///
/// Immutable for the duration of a run and shared by every file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Run the rules even when no gating import is found.
    #[serde(alias = "skipImportDetection")]
    pub skip_import_detection: bool,
    /// Module specifiers whose default import gates the transformation.
    #[serde(alias = "importSources")]
    pub import_sources: Vec<String>,
    /// Binding name assumed when no gating import exists.
    #[serde(alias = "defaultBinding")]
    pub default_binding: String,
    /// Call names treated as "runs before every test" hooks.
    #[serde(alias = "setupHooks")]
    pub setup_hooks: Vec<String>,
    /// Conventional fake-clock receiver names.
    #[serde(alias = "clockIdentifiers")]
    pub clock_identifiers: Vec<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            skip_import_detection: false,
            import_sources: vec!["sinon".to_string(), "sinon-sandbox".to_string()],
            default_binding: "sinon".to_string(),
            setup_hooks: vec!["beforeEach".to_string()],
            clock_identifiers: vec!["clock".to_string()],
        }
    }
}

impl TransformOptions {
    /// Set whether to run without a detected gating import.
    pub fn skip_import_detection(mut self, skip: bool) -> Self {
        self.skip_import_detection = skip;
        self
    }

    pub fn is_setup_hook(&self, name: &str) -> bool {
        self.setup_hooks.iter().any(|h| h == name)
    }

    pub fn is_clock_identifier(&self, name: &str) -> bool {
        self.clock_identifiers.iter().any(|c| c == name)
    }

    pub fn is_import_source(&self, specifier: &str) -> bool {
        self.import_sources.iter().any(|s| s == specifier)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(flatten)]
    pub transform: TransformOptions,
    /// Glob patterns for paths to exclude (e.g., "**/fixtures/**").
    #[serde(default, alias = "excludedPaths")]
    pub excluded_paths: Vec<String>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text. Empty text yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Look for a configuration file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Validate a configuration.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let options = &config.transform;
    if options.import_sources.iter().all(|s| s.trim().is_empty()) {
        anyhow::bail!("import_sources must name at least one module");
    }
    if options.default_binding.trim().is_empty() {
        anyhow::bail!("default_binding must not be empty");
    }
    if !is_identifier_name(&options.default_binding) {
        anyhow::bail!(
            "default_binding {:?} is not a valid identifier",
            options.default_binding
        );
    }
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }
    Ok(())
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
