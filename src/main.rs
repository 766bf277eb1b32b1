//! Tubebrief CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubebrief::cli::commands::{self, ProcessRequest, RunStatus};
use tubebrief::cli::{Cli, Output};
use tubebrief::config::{Credentials, Settings};

const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubebrief={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tokio::select! {
        result = run(cli) => match result {
            Ok(RunStatus::Success) => ExitCode::SUCCESS,
            Ok(RunStatus::Failed) => ExitCode::from(EXIT_FAILURE),
            Err(e) => {
                Output::error(&format!("UnexpectedFailure: {:?}", e));
                ExitCode::from(EXIT_FAILURE)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            Output::warning("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: Cli) -> Result<RunStatus> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };
    let credentials = Credentials::from_env();

    let request = ProcessRequest::new(
        cli.url.as_deref(),
        cli.channel.as_deref(),
        cli.count,
        cli.dry_run,
    );

    commands::run_process(&request, settings, credentials).await
}
