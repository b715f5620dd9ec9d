//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "batchmerge.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing batchmerge configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set source.directory in {} (or export BATCHMERGE_SOURCE)", self.output);
                println!("  2. Validate configuration: batchmerge validate-config");
                println!("  3. Preview pending batches: batchmerge run --dry-run");
                println!("  4. Run: batchmerge run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(1)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# batchmerge configuration

[application]
log_level = "info"

[source]
directory = "${BATCHMERGE_SOURCE}"

[merge]
batch_column = "batch_id"

[state]
gate = "non_empty_dir"
"#
        .to_string()
    }

    /// Generate configuration with every option and comments
    fn generate_config_with_examples() -> String {
        r#"# batchmerge configuration
#
# Every option is shown with its default. Values may reference environment
# variables as ${NAME}; any option can also be overridden with
# BATCHMERGE_<SECTION>_<KEY>, e.g. BATCHMERGE_SOURCE_DIRECTORY.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Report pending batches without creating directories, extracting or
# writing the master file
dry_run = false

# ============================================================================
# Source Directory
# ============================================================================
[source]
# Directory holding the export archives. Batch directories and the master
# file are created here too.
directory = "${BATCHMERGE_SOURCE}"

# Suffix an archive file name must carry
archive_suffix = ".zip"

# Record file inside each archive
record_file_name = "candidates.csv"

# Attachments live under this path segment with this extension
attachments_dir = "Attachments"
attachment_extension = ".msg"

# Column delimiter of record files and the master file
delimiter = "|"

# ============================================================================
# Merge Settings
# ============================================================================
[merge]
# Every record file must carry this column; the master is sorted by it
candidate_column = "candidate_id"

# Column added to every record with the batch identifier
batch_column = "batch_id"

# Master file, written into the source directory
master_file_name = "master_candidates.csv"

# Rows written between flushes of the master file
chunk_size = 10000

# ============================================================================
# Batch State
# ============================================================================
[state]
# non_empty_dir: a batch directory with any content counts as processed
# marker:        only a batch directory holding the completion marker counts
gate = "non_empty_dir"

# Write a completion marker into each fully processed batch directory
write_marker = true
marker_file_name = ".batch_complete.json"

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = true

# Log directory; empty means the source directory
local_path = ""

# Log file name prefix
file_prefix = "app_log"

# daily | never
local_rotation = "daily"

# text | json
format = "text"
"#
        .to_string()
    }
}
