//! Run command implementation
//!
//! This module implements the `run` command: one pass over the source
//! directory that extracts new batches and rewrites the master file.

use crate::config::{load_config, BatchMergeConfig, GateMode};
use crate::core::run::{RunCoordinator, RunSummary};
use crate::domain::{BatchMergeError, Result};
use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Dry run mode - report pending batches without touching the source directory
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source directory
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Override the idempotency gate (non_empty_dir or marker)
    #[arg(long, value_name = "MODE")]
    pub gate: Option<String>,
}

impl RunArgs {
    /// Load the configuration and apply CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`BatchMergeError::Configuration`] when the file cannot be
    /// loaded or the overridden configuration is invalid.
    pub fn load(&self, config_path: &str) -> Result<BatchMergeConfig> {
        let mut config = load_config(config_path)?;
        self.apply_overrides(&mut config)?;
        config.validate().map_err(|e| {
            BatchMergeError::Configuration(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }

    /// Apply CLI overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut BatchMergeConfig) -> Result<()> {
        if let Some(source) = &self.source {
            tracing::debug!(source = %source.display(), "Overriding source directory from CLI");
            config.source.directory = source.clone();
        }

        if let Some(gate) = &self.gate {
            config.state.gate = GateMode::from_str(gate).map_err(BatchMergeError::Configuration)?;
            if config.state.gate == GateMode::Marker {
                config.state.write_marker = true;
            }
        }

        if self.dry_run {
            config.application.dry_run = true;
        }

        Ok(())
    }

    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let config = match self.load(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration error");
                eprintln!("❌ {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - source directory will not be modified");
            println!("🔍 DRY RUN MODE - No directories, extractions or master file will be written");
            println!();
        }

        println!("🚀 Processing {}", config.source.directory.display());
        println!();

        let coordinator = RunCoordinator::new(config).with_shutdown_signal(shutdown_signal);

        // The pipeline is blocking I/O end to end; a panic inside it surfaces
        // here as a join error after the session has flushed.
        let outcome = tokio::task::spawn_blocking(move || coordinator.execute_run())
            .await
            .unwrap_or_else(|e| {
                Err(BatchMergeError::Runtime(format!(
                    "Run terminated unexpectedly: {e}"
                )))
            });

        let summary = match outcome {
            Ok(s) => s,
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "Run stopped by fatal error");
                eprintln!("❌ Run stopped: {e}");
                eprintln!("   Records merged so far were exported before exit.");
                return Ok(1); // Fatal error exit code
            }
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("❌ Run failed: {e}");
                return Ok(1);
            }
        };

        print_summary(&summary);

        let exit_code = if summary.interrupted {
            println!("⚠️  Run interrupted. Processed batches were exported.");
            println!("   Run the same command to pick up the remaining archives.");
            println!();
            tracing::info!("Run interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_successful() {
            println!("✅ Run completed successfully!");
            0
        } else {
            println!("⚠️  Run completed with warnings");
            0
        };

        Ok(exit_code)
    }
}

fn print_summary(summary: &RunSummary) {
    println!("📊 Run Summary:");
    println!("  Archives Found: {}", summary.archives_found);
    println!("  Batches Processed: {}", summary.batches_processed);
    println!("  Batches Skipped: {}", summary.batches_skipped);
    println!("  Batches Failed: {}", summary.batches_failed);
    println!("  Rows Seeded: {}", summary.rows_seeded);
    println!("  Rows Merged: {}", summary.rows_merged);
    println!("  Rows Exported: {}", summary.rows_exported);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if summary.dry_run && !summary.pending_batches.is_empty() {
        println!("🔍 Batches that would be processed:");
        for batch in &summary.pending_batches {
            println!("  - {batch}");
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("⚠️  Warnings:");
        for warning in &summary.warnings {
            println!(
                "  - {}: {}",
                warning.batch_id.as_deref().unwrap_or("-"),
                warning.message
            );
            if let Some(file) = &warning.flagged_file {
                println!("    File: {file}");
            }
        }
        println!();
    }
}
