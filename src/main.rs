// SPDX-License-Identifier: PMPL-1.0-or-later
//! Conformancebot CLI - Accessibility Rule Evaluation Engine
//!
//! Part of the gitbot-fleet ecosystem.

use conformancebot::config::load_config;
use conformancebot::goldmaster::{self, format_summary};
use conformancebot::report::{generate_report, OutputFormat};
use conformancebot::{scanner, Engine, EngineConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Accessibility rule evaluation engine for gitbot-fleet
#[derive(Parser)]
#[command(name = "conformancebot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a document, or every document under a directory
    Scan {
        /// File or directory to scan
        path: PathBuf,

        /// Configuration file (TOML, JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Replay a gold-master corpus against its expectations
    Goldmaster {
        /// Corpus root directory
        dir: PathBuf,

        /// Configuration file (TOML, JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the JSON summary to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the registered rules
    Rules,
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("conformancebot=debug")
        } else {
            EnvFilter::new("conformancebot=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(p) => Ok(load_config(p)?),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { path, config, format, output, verbose } => {
            init_logging(verbose);
            let config = resolve_config(config.as_deref())?;
            let engine = Engine::new();
            let format: OutputFormat = format.into();

            if path.is_dir() {
                let reports = scanner::scan_directory(&engine, &path, &config)?;
                let rendered = match format {
                    OutputFormat::Json => serde_json::to_string_pretty(&reports)?,
                    _ => reports
                        .iter()
                        .map(|r| format!("# {}\n{}", r.path.display(), generate_report(&r.report, format)))
                        .collect::<Vec<_>>()
                        .join("\n"),
                };
                write_output(&rendered, output.as_deref())?;

                if reports.iter().any(|r| r.report.has_failures()) {
                    std::process::exit(1);
                }
            } else {
                let report = scanner::scan_file(&engine, &path, &config)?;
                write_output(&generate_report(&report, format), output.as_deref())?;

                if report.has_failures() {
                    std::process::exit(1);
                }
            }
        }

        Commands::Goldmaster { dir, config, output, verbose } => {
            init_logging(verbose);
            let config = resolve_config(config.as_deref())?;
            let summary = goldmaster::run_corpus(&Engine::new(), &dir, &config)?;
            println!("{}", format_summary(&summary));
            if let Some(p) = output.as_deref() {
                write_output(&summary.to_json()?, Some(p))?;
            }

            if !summary.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Rules => {
            let engine = Engine::new();
            for rule in engine.registry().iter() {
                println!("{:<32} {:<8} {}", rule.id(), rule.criterion(), rule.description());
            }
        }
    }

    Ok(())
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
