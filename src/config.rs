//! Configuration module for Rampart.
//!
//! This module handles loading and validating configuration from:
//! - YAML configuration files (`rampart.yaml`)
//! - Environment variables
//! - CLI arguments
//!
//! # Configuration File Format
//!
//! ```yaml
//! # rampart.yaml
//!
//! # Discovery options
//! scan:
//!   exclude_patterns:
//!     - "**/fixtures/**"
//!   max_depth: 100
//!
//! # Evaluation engine
//! engine:
//!   threads: 0          # 0 = available parallelism
//!   timeout_secs: 300
//!
//! # Rule selection
//! rules:
//!   include: []         # empty = every registered rule
//!   exclude:
//!     - AVD-AWS-0089
//!   minimum_severity: medium
//!   severity_overrides:
//!     aws-s3-enable-versioning: high
//!
//! # Output options
//! output:
//!   colored: true
//!   pretty: true
//! ```

use crate::error::{RampartError, Result, ResultExt};
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default configuration file names, looked up in the working directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["rampart.yaml", "rampart.yml", ".rampart.yaml"];

static BRACED_VAR: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("Invalid regex"));
static BARE_VAR: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex"));

/// Discovery options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Patterns to exclude from scanning (glob patterns).
    pub exclude_patterns: Vec<String>,

    /// Maximum depth for recursive directory scanning.
    pub max_depth: usize,

    /// Follow symbolic links while walking directories.
    pub follow_links: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude_patterns: vec!["**/.terraform/**".to_string(), "**/node_modules/**".to_string()],
            max_depth: default_max_depth(),
            follow_links: false,
        }
    }
}

/// Evaluation engine options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineOptions {
    /// Worker threads for rule evaluation; 0 uses the available parallelism.
    pub threads: usize,

    /// Overall evaluation timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Rule selection options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulesOptions {
    /// Rules to run (AVD id or long id). Empty means every registered rule.
    pub include: Vec<String>,

    /// Rules to skip (AVD id or long id).
    pub exclude: Vec<String>,

    /// Drop findings below this severity.
    pub minimum_severity: Option<Severity>,

    /// Severity overrides keyed by AVD id or long id.
    pub severity_overrides: BTreeMap<String, Severity>,
}

/// Output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Use colored output.
    pub colored: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            colored: true,
            pretty: true,
        }
    }
}

/// Main configuration structure with nested sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Discovery options
    pub scan: ScanOptions,

    /// Evaluation engine options
    pub engine: EngineOptions,

    /// Rule selection
    pub rules: RulesOptions,

    /// Output options
    pub output: OutputOptions,
}

const fn default_max_depth() -> usize {
    100
}

impl Config {
    /// Load configuration from a YAML string.
    ///
    /// `${VAR}` and `$VAR` references are expanded from the environment
    /// before parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(content: &str) -> Result<Self> {
        tracing::debug!("Parsing configuration from YAML");
        let expanded = expand_env_vars(content);

        let config: Self = serde_yaml::from_str(&expanded).map_err(|e| {
            RampartError::config_parse(e.to_string(), Some(Box::new(e)), file!(), line!())
        })?;
        config.validate()?;

        tracing::debug!(
            exclude_patterns = config.scan.exclude_patterns.len(),
            include = config.rules.include.len(),
            exclude = config.rules.exclude.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path).with_path(path)?;
        Self::from_yaml(&content)
    }

    /// Load the explicit configuration file, or the first default file found
    /// in `dir`, or the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but is invalid.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::discover(dir) {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("No configuration file found, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// First default configuration file present in `dir`.
    #[must_use]
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Check values that deserialize fine but make no sense.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValue` for the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_depth == 0 {
            return Err(crate::err!(ConfigValue {
                key: "scan.max_depth".to_string(),
                message: "must be at least 1".to_string(),
            }));
        }
        if self.engine.timeout_secs == Some(0) {
            return Err(crate::err!(ConfigValue {
                key: "engine.timeout_secs".to_string(),
                message: "must be at least 1 second".to_string(),
            }));
        }
        if let Some(pattern) = self
            .scan
            .exclude_patterns
            .iter()
            .find(|pattern| glob::Pattern::new(pattern).is_err())
        {
            return Err(crate::err!(ConfigValue {
                key: "scan.exclude_patterns".to_string(),
                message: format!("invalid glob pattern '{pattern}'"),
            }));
        }
        Ok(())
    }

    /// The evaluation timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.engine.timeout_secs.map(std::time::Duration::from_secs)
    }

    /// Generate an example YAML configuration.
    #[must_use]
    pub fn example_yaml() -> String {
        r#"# Rampart Configuration File

# Discovery options
scan:
  # Patterns to exclude from scanning (glob patterns)
  exclude_patterns:
    - "**/.terraform/**"
    - "**/node_modules/**"

  # Maximum depth for recursive directory scanning
  max_depth: 100

  # Follow symbolic links
  follow_links: false

# Evaluation engine
engine:
  # Worker threads for rule evaluation (0 = available parallelism)
  threads: 0

  # Abort remaining rules after this many seconds
  # timeout_secs: 300

# Rule selection
rules:
  # Only run these rules (AVD id or long id, empty = all rules)
  include: []

  # Never run these rules
  exclude: []
  #   - AVD-AWS-0089
  #   - aws-sam-enable-function-tracing

  # Drop findings below this severity (low, medium, high, critical)
  # minimum_severity: medium

  # Override rule severities
  severity_overrides: {}
  #   aws-s3-enable-versioning: high

# Output options
output:
  # Use colored output in terminal
  colored: true

  # Pretty-print JSON output
  pretty: true
"#
        .to_string()
    }

    /// Merge CLI arguments into the configuration.
    pub fn merge_cli_args(&mut self, args: &crate::cli::ScanArgs) {
        self.scan.exclude_patterns.extend(args.exclude_patterns.iter().cloned());
        if let Some(max_depth) = args.max_depth {
            self.scan.max_depth = max_depth;
        }
        if !args.rules.is_empty() {
            self.rules.include = args.rules.clone();
        }
        self.rules.exclude.extend(args.skip_rules.iter().cloned());
        if let Some(severity) = args.min_severity {
            self.rules.minimum_severity = Some(severity);
        }
        if let Some(threads) = args.threads {
            self.engine.threads = threads;
        }
        if let Some(timeout) = args.timeout {
            self.engine.timeout_secs = Some(timeout);
        }
        if args.no_color {
            self.output.colored = false;
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax; unknown variables are left as is.
fn expand_env_vars(content: &str) -> String {
    let braced = BRACED_VAR.replace_all(content, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    BARE_VAR
        .replace_all(&braced, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
