//! CLI entry point for the downloader tool.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ff_downloader_core::{DownloadEngine, LinksError, read_links};
use tracing::{debug, info};

mod app_config;
mod cli;
mod output;

use cli::Args;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Run finished; individual links may still have failed.
    Success,
    /// No links file existed; an example was written instead.
    InputMissing,
    /// Setup failed before any download started.
    Failure,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            ProcessExit::Success => 0,
            ProcessExit::InputMissing => 1,
            ProcessExit::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);

    match run(&args).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ProcessExit::Failure.into()
        }
    }
}

/// Installs the fmt subscriber.
///
/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info).
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(args: &Args) -> Result<ProcessExit> {
    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_config(args.config.as_deref())?;
    let settings = app_config::build_run_settings(args, &file_config);
    debug!(?settings, "resolved run settings");

    let links = match read_links(&settings.links_file) {
        Ok(links) => links,
        Err(e @ LinksError::InputMissing { .. }) => {
            println!("{e}");
            return Ok(ProcessExit::InputMissing);
        }
        Err(e) => return Err(e.into()),
    };

    if links.is_empty() {
        println!("{}", output::NO_LINKS_MESSAGE);
        return Ok(ProcessExit::Success);
    }

    let output_dir = settings.config.output_dir.clone();
    let engine = DownloadEngine::new(settings.config).context("Failed to set up downloads")?;
    info!(
        links = links.len(),
        workers = engine.workers(),
        output_dir = %output_dir.display(),
        "Downloader starting"
    );

    let summary = engine.run_all(&links).await?;
    output::print_run_summary(&summary);

    Ok(ProcessExit::Success)
}
