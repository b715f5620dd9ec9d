// Batchmerge - Zip Batch Extractor and Record Merger
// Copyright (c) 2025 Batchmerge Contributors
// Licensed under the MIT License

use batchmerge::cli::{Cli, Commands};
use batchmerge::config::LoggingConfig;
use batchmerge::logging::init_logging;
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    let (log_level, logging_config) = logging_setup(&cli);
    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Batchmerge - Zip Batch Extractor and Record Merger"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                    println!("\n⚠️  Shutdown signal received, finishing current batch...");
                    let _ = shutdown_tx.send(true);
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                    println!("\n⚠️  Shutdown signal received, finishing current batch...");
                    let _ = shutdown_tx.send(true);
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                println!("\n⚠️  Shutdown signal received, finishing current batch...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    // Execute command and get exit code
    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            1
        }
    };

    // process::exit skips destructors; flush the log file first
    drop(logging_guard);
    process::exit(exit_code);
}

/// Log level and sinks for this invocation.
///
/// Only a real `run` writes a log file, into the configured log directory
/// (the source directory by default). Other commands and dry runs log to the
/// console only.
fn logging_setup(cli: &Cli) -> (String, LoggingConfig) {
    let cli_level = cli.log_level.clone();

    if let Commands::Run(args) = &cli.command {
        if let Ok(config) = args.load(&cli.config) {
            let level = cli_level.unwrap_or_else(|| config.application.log_level.clone());
            let logging = if config.application.dry_run {
                LoggingConfig::console_only()
            } else {
                config.resolved_logging()
            };
            return (level, logging);
        }
    }

    (
        cli_level.unwrap_or_else(|| "info".to_string()),
        LoggingConfig::console_only(),
    )
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
