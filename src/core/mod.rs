//! Core business logic for batchmerge.
//!
//! This module contains the batch pipeline and its orchestration.
//!
//! # Modules
//!
//! - [`archive`] - Archive discovery and extraction
//! - [`state`] - Idempotency gate and completion markers
//! - [`records`] - Record augmentation, accumulation and the master file
//! - [`run`] - Run orchestration, session and summary
//!
//! # Run Workflow
//!
//! 1. **Seed**: Load the existing master file, if any
//! 2. **Scan**: List archives in the source directory
//! 3. **Gate**: Skip batches whose directory shows they were processed
//! 4. **Extract**: Unpack the archive into its batch directory
//! 5. **Augment**: Stamp the record file with the batch identifier
//! 6. **Merge**: Append the batch's rows to the accumulated dataset
//! 7. **Export**: Sort and write the master file once
//!
//! # Example
//!
//! ```rust,no_run
//! use batchmerge::config::load_config;
//! use batchmerge::core::run::RunCoordinator;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("batchmerge.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = RunCoordinator::new(config).with_shutdown_signal(shutdown_rx);
//!
//! let summary = coordinator.execute_run()?;
//!
//! println!("Processed: {}", summary.batches_processed);
//! println!("Skipped: {}", summary.batches_skipped);
//! println!("Rows exported: {}", summary.rows_exported);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod records;
pub mod run;
pub mod state;
