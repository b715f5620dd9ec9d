//! Status command implementation
//!
//! This module implements the `status` command, which reports the state of
//! every batch archive and the master file without modifying anything.

use crate::config::load_config;
use crate::core::archive::BatchScanner;
use crate::core::records::MasterFile;
use crate::core::state::{BatchState, BatchStateTracker, CompletionMarker};
use crate::domain::BatchId;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Override the source directory
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
}

/// One row of the status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatusLine {
    /// Batch identifier
    pub batch_id: String,
    /// Gate state
    pub state: BatchState,
    /// Rows merged, from the completion marker
    pub rows: Option<usize>,
    /// Completion time, from the completion marker
    pub completed_at: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking batch status");

        println!("📊 Batch Status");
        println!();

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };
        if let Some(source) = &self.source {
            config.source.directory = source.clone();
        }

        let scanner = BatchScanner::new(&config.source.directory, &config.source.archive_suffix);
        let tracker = BatchStateTracker::new(
            &config.source.directory,
            config.state.gate,
            &config.state.marker_file_name,
        );

        let archives = match scanner.scan() {
            Ok(a) => a,
            Err(e) => {
                println!("❌ Failed to read source directory");
                println!("   Error: {}", e);
                return Ok(1);
            }
        };

        let mut lines = Vec::new();
        for archive in archives {
            let batch_id = match BatchId::from_archive_path(&archive) {
                Ok(id) => id,
                Err(e) => {
                    println!("⚠️  {}: {}", archive.display(), e);
                    continue;
                }
            };
            match collect_line(&tracker, &config.state.marker_file_name, batch_id) {
                Ok(line) => lines.push(line),
                Err(e) => {
                    println!("❌ Failed to inspect {}", archive.display());
                    println!("   Error: {}", e);
                    return Ok(1);
                }
            }
        }

        println!("Source: {}", config.source.directory.display());
        println!("Gate: {}", config.state.gate);
        println!();

        if lines.is_empty() {
            println!("No batch archives found.");
        } else {
            println!(
                "{:<32} {:<12} {:>10}  {}",
                "Batch", "State", "Rows", "Completed"
            );
            println!("{}", "-".repeat(80));
            for line in &lines {
                println!(
                    "{:<32} {:<12} {:>10}  {}",
                    line.batch_id,
                    line.state.to_string(),
                    line.rows.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                    line.completed_at.as_deref().unwrap_or("-")
                );
            }
            let pending = lines.iter().filter(|l| l.state.needs_processing()).count();
            println!();
            println!("Total: {} archive(s), {} pending", lines.len(), pending);
        }
        println!();

        let master = MasterFile::from_config(&config);
        match master.load() {
            Ok(table) if table.headers().is_empty() => {
                println!("Master file: {} (not written yet)", master.path().display());
            }
            Ok(table) => {
                println!(
                    "Master file: {} ({} rows, {} columns)",
                    master.path().display(),
                    table.len(),
                    table.headers().len()
                );
            }
            Err(e) => {
                println!("⚠️  Master file {} is unreadable", master.path().display());
                println!("   Error: {}", e);
            }
        }
        println!();

        Ok(0)
    }
}

fn collect_line(
    tracker: &BatchStateTracker,
    marker_file_name: &str,
    batch_id: BatchId,
) -> crate::domain::Result<BatchStatusLine> {
    let resolution = tracker.inspect(&batch_id)?;
    let marker = match resolution.state {
        BatchState::Missing => None,
        _ => CompletionMarker::read(&resolution.extraction_dir, marker_file_name).unwrap_or_else(
            |e| {
                tracing::warn!(batch_id = %batch_id, error = %e, "Ignoring unreadable marker");
                None
            },
        ),
    };

    Ok(BatchStatusLine {
        batch_id: batch_id.into_inner(),
        state: resolution.state,
        rows: marker.as_ref().map(|m| m.rows_merged),
        completed_at: marker.map(|m| m.completed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    })
}
