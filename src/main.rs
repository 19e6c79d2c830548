//! cnf-lsp - language server for asn2wrs conformance files
//!
//! This is the main CLI entry point. Without a subcommand it serves the
//! language server protocol over stdio.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cnf_lsp::config::ServerConfig;
use cnf_lsp::lsp::{serve_stdio, validate_document, CnfLanguageServer, Diagnostic, Severity};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// cnf-lsp - asn2wrs conformance file language server
#[derive(Parser)]
#[command(name = "cnf-lsp")]
#[command(version)]
#[command(about = "Language server and checker for asn2wrs conformance (.cnf) files", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Write logs to a file (default location when no path is given)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<Option<PathBuf>>,

    /// Milliseconds to wait after an edit before publishing diagnostics
    #[arg(long, global = true, value_name = "N")]
    debounce_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the language server protocol over stdio
    Serve,

    /// Validate conformance files and print their diagnostics
    Check {
        /// Files or directories (searched for *.cnf)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Diagnostics for one checked file
#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;
    if cli.debug {
        config.log_filter = "debug".to_string();
    }
    if let Some(debounce_ms) = cli.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = Some(log_file.unwrap_or_else(ServerConfig::default_log_file));
    }

    init_logging(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let server = CnfLanguageServer::new(config);
            serve_stdio(server).await?;
        }

        Commands::Check { paths, format } => {
            let reports = check_paths(&paths)?;
            let has_errors = reports
                .iter()
                .flat_map(|report| &report.diagnostics)
                .any(|d| d.severity == Severity::Error);

            match format {
                OutputFormat::Text => print_text(&reports),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
            }

            if has_errors {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber. stdout carries the protocol, so logs go
/// to stderr or to the configured file.
fn init_logging(config: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;

    match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }

    Ok(())
}

fn check_paths(paths: &[PathBuf]) -> Result<Vec<FileReport>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_cnf(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    info!("Checking {} file(s)", files.len());

    files
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let diagnostics = validate_document(&text);
            debug!(path = %path.display(), count = diagnostics.len(), "Checked");
            Ok(FileReport { path, diagnostics })
        })
        .collect()
}

fn is_cnf(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "cnf")
}

fn print_text(reports: &[FileReport]) {
    for report in reports {
        for d in &report.diagnostics {
            println!(
                "{}:{}:{}: {}: {}",
                report.path.display(),
                d.range.start.line + 1,
                d.range.start.character + 1,
                d.severity.as_str(),
                d.message
            );
        }
    }
}
