// Batchmerge - Zip Batch Extractor and Record Merger
// Copyright (c) 2025 Batchmerge Contributors
// Licensed under the MIT License

//! # Batchmerge - Zip Batch Extractor and Record Merger
//!
//! Batchmerge watches a directory of export archives. Each archive is one
//! batch: a pipe-delimited record file plus mail attachments. Every run
//! extracts the batches it has not seen before, tags their records with the
//! batch name and folds them into a single sorted master file.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Scanning** a source directory for batch archives
//! - **Gating** batches so each archive is extracted and merged once
//! - **Augmenting** each batch's record file with a batch column
//! - **Merging** all records into a master file sorted by candidate and batch
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (archive, state, records, run)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batchmerge::config::load_config;
//! use batchmerge::core::run::RunCoordinator;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("batchmerge.toml")?;
//!
//!     let summary = RunCoordinator::new(config).execute_run()?;
//!
//!     println!(
//!         "Merged {} rows from {} batches",
//!         summary.rows_merged, summary.batches_processed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Idempotency
//!
//! A batch's extraction directory doubles as its processed flag. With the
//! default `non_empty_dir` gate, any content in the directory means the batch
//! is done. The `marker` gate instead requires the completion marker written
//! after a clean extraction, so batches interrupted mid-extraction are picked
//! up again on the next run.
//!
//! ## Error Handling
//!
//! Batchmerge uses [`domain::BatchMergeError`] for all errors. Per-batch
//! failures are recorded in the run summary and the run moves on; losing the
//! source directory or an unexpected runtime fault stops the run after the
//! records merged so far have been exported.
//!
//! ```rust,no_run
//! use batchmerge::domain::BatchMergeError;
//!
//! fn example() -> Result<(), BatchMergeError> {
//!     let config = batchmerge::config::load_config("batchmerge.toml")?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
