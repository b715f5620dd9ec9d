//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the batchmerge configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let logging = config.resolved_logging();

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Source Directory: {}", config.source.directory.display());
        println!("  Archive Suffix: {}", config.source.archive_suffix);
        println!("  Record File: {}", config.source.record_file_name);
        println!(
            "  Attachments: {}/*{}",
            config.source.attachments_dir, config.source.attachment_extension
        );
        println!("  Delimiter: '{}'", config.source.delimiter);
        println!("  Candidate Column: {}", config.merge.candidate_column);
        println!("  Batch Column: {}", config.merge.batch_column);
        println!("  Master File: {}", config.master_path().display());
        println!("  Export Chunk Size: {}", config.merge.chunk_size);
        println!("  Gate: {}", config.state.gate);
        println!("  Completion Markers: {}", config.state.write_marker);
        if logging.local_enabled {
            println!(
                "  Log File: {} ({}, {})",
                crate::logging::current_log_file(&logging).display(),
                logging.format,
                logging.local_rotation
            );
        } else {
            println!("  Log File: disabled");
        }
        if !config.source.directory.is_dir() {
            println!();
            println!(
                "⚠️  Source directory {} is not reachable from this host",
                config.source.directory.display()
            );
        }
        println!();

        Ok(0)
    }
}
