//! Configuration management for batchmerge.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! batchmerge uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BATCHMERGE_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batchmerge::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("batchmerge.toml")?;
//!
//! println!("Source: {}", config.source.directory.display());
//! println!("Master: {}", config.master_path().display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level, dry run
//! - [`SourceConfig`] - Source directory and archive layout
//! - [`MergeConfig`] - Column names, master file, export chunking
//! - [`StateConfig`] - Idempotency gate and completion markers
//! - [`LoggingConfig`] - Log file location, rotation and format
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! directory = "${BATCHMERGE_SOURCE}"
//!
//! [merge]
//! batch_column = "batch_id"
//!
//! [state]
//! gate = "non_empty_dir"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ArchiveLayout, BatchMergeConfig, GateMode, LoggingConfig, MergeConfig,
    SourceConfig, StateConfig,
};
