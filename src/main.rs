//! Rampart CLI entry point.
//!
//! This binary provides the command-line interface for Rampart.

use clap::Parser;
use rampart::cli::{Cli, Commands, ScanArgs};
use rampart::reporter::Reporter;
use rampart::rules::RuleSelection;
use rampart::{Config, RampartError, Registry, Scanner, Severity};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");

            eprintln!("Error: {e}");

            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut i = 0;
                while let Some(cause) = source {
                    eprintln!("  {i}: {cause}");
                    source = cause.source();
                    i += 1;
                }
            }

            let code = e
                .downcast_ref::<RampartError>()
                .map_or(1, RampartError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        // RUST_LOG wins over the verbose flag
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let base_level = match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::new(format!("warn,rampart={base_level}"))
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    tracing::debug!("Loading configuration");
    let mut config = Config::load(cli.config.as_deref(), Path::new("."))?;

    match cli.command {
        Commands::Scan(args) => {
            config.merge_cli_args(&args);
            config.validate()?;
            scan(config, &args).await
        }

        Commands::Rules(args) => {
            let registry = Registry::with_builtin_rules()?;
            let listing = Reporter::new(&config).rules(registry.definitions(), args.format)?;
            println!("{listing}");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init => {
            let config_path = Path::new("rampart.yaml");

            if config_path.exists() {
                anyhow::bail!("Configuration file already exists: {}", config_path.display());
            }

            std::fs::write(config_path, Config::example_yaml())?;
            println!("Created example configuration: rampart.yaml");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate(args) => match Config::from_file(&args.config) {
            Ok(_) => {
                println!("Configuration is valid: {}", args.config.display());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Configuration error: {e}");
                Ok(ExitCode::from(1))
            }
        },
    }
}

async fn scan(config: Config, args: &ScanArgs) -> anyhow::Result<ExitCode> {
    let scanner = Scanner::new(config.clone())?;

    for id in RuleSelection::from_options(&config.rules).unknown_ids(scanner.registry()) {
        tracing::warn!(rule = %id, "Unknown rule id in selection");
    }

    let result = scanner.scan_paths(&args.paths).await?;

    let report = Reporter::new(&config).generate(&result, args.format)?;
    if let Some(output_path) = &args.output {
        std::fs::write(output_path, &report)?;
        tracing::info!(path = %output_path.display(), "Report written");
    } else {
        println!("{report}");
    }

    let exit_code = if result.has_findings_at_or_above(Severity::High) {
        2
    } else if !result.findings.is_empty() && args.strict {
        1
    } else {
        0
    };

    Ok(ExitCode::from(exit_code))
}
