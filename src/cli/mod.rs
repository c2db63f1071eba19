//! Command-line interface module.
//!
//! This module defines the CLI structure using Clap, including
//! all commands, arguments, and options.
//!
//! # Commands
//!
//! - `scan`: Scan Terraform modules and CloudFormation templates
//! - `rules`: List the registered rules
//! - `init`: Create an example configuration file
//! - `validate`: Validate a configuration file
//!
//! # Example Usage
//!
//! ```bash
//! # Scan local directories
//! rampart scan ./network ./storage
//!
//! # Only run two rules and write a JSON report
//! rampart scan ./infra --rule AVD-AWS-0086 --rule aws-s3-enable-versioning \
//!     --format json --output report.json
//!
//! # Fail the build on any finding
//! rampart scan ./infra --strict
//!
//! # Initialize configuration
//! rampart init
//!
//! # Validate configuration
//! rampart validate rampart.yaml
//! ```

use crate::types::{ReportFormat, Severity};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rampart - security misconfiguration scanner for infrastructure as code.
#[derive(Parser, Debug)]
#[command(
    name = "rampart",
    author,
    version,
    about = "Security misconfiguration scanner for Terraform and CloudFormation/SAM",
    long_about = "Rampart parses Terraform/OpenTofu modules and CloudFormation/SAM templates, \
                  adapts them into a typed model of cloud resources, and reports security \
                  misconfigurations with the exact file and lines responsible."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "RAMPART_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan files and directories for misconfigurations
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// List the registered rules
    Rules(RulesArgs),

    /// Create an example configuration file
    Init,

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Patterns to exclude from scanning (glob patterns)
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Maximum depth for recursive directory scanning
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Only run these rules (AVD id or long id)
    #[arg(long = "rule", value_name = "ID")]
    pub rules: Vec<String>,

    /// Skip these rules (AVD id or long id)
    #[arg(long = "skip-rule", value_name = "ID")]
    pub skip_rules: Vec<String>,

    /// Drop findings below this severity
    #[arg(long, value_name = "SEVERITY")]
    pub min_severity: Option<Severity>,

    /// Worker threads for rule evaluation (0 = available parallelism)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Stop evaluating rules after this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Exit with code 1 on findings below High severity
    #[arg(long)]
    pub strict: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for the rules command.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: ReportFormat,
}

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(value_name = "FILE", default_value = "rampart.yaml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parsing() {
        // Verify CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_command() {
        let cli = Cli::parse_from(["rampart", "scan", "./infra"]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.paths, vec![PathBuf::from("./infra")]);
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.rules.is_empty());
                assert!(args.max_depth.is_none());
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_scan_with_options() {
        let cli = Cli::parse_from([
            "rampart",
            "scan",
            "./infra",
            "--format",
            "json",
            "--output",
            "report.json",
            "--rule",
            "AVD-AWS-0086",
            "--skip-rule",
            "aws-s3-enable-versioning",
            "--min-severity",
            "high",
            "--threads",
            "2",
            "--timeout",
            "30",
            "--strict",
            "--no-color",
        ]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.output, Some(PathBuf::from("report.json")));
                assert_eq!(args.rules, vec!["AVD-AWS-0086".to_string()]);
                assert_eq!(args.skip_rules, vec!["aws-s3-enable-versioning".to_string()]);
                assert_eq!(args.min_severity, Some(Severity::High));
                assert_eq!(args.threads, Some(2));
                assert_eq!(args.timeout, Some(30));
                assert!(args.strict);
                assert!(args.no_color);
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_scan_requires_a_path() {
        assert!(Cli::try_parse_from(["rampart", "scan"]).is_err());
        assert!(Cli::try_parse_from(["rampart", "scan", "./infra", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_rules_command() {
        let cli = Cli::parse_from(["rampart", "rules", "--format", "json"]);
        match cli.command {
            Commands::Rules(args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("Expected Rules command"),
        }
    }

    #[test]
    fn test_init_command() {
        let cli = Cli::parse_from(["rampart", "init"]);
        assert!(matches!(cli.command, Commands::Init));
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["rampart", "validate", "custom.yaml"]);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.config, PathBuf::from("custom.yaml"));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::parse_from(["rampart", "-vvv", "--config", "custom.yaml", "scan", "./infra"]);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn test_alias() {
        let cli = Cli::parse_from(["rampart", "s", "./infra"]);
        assert!(matches!(cli.command, Commands::Scan(_)));
    }
}
