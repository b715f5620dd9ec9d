//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output
//! - A local log file under the source directory (text or JSON lines)
//! - Daily or no rotation
//!
//! # Example
//!
//! ```no_run
//! use batchmerge::logging::init_logging;
//! use batchmerge::config::LoggingConfig;
//!
//! let config = LoggingConfig::console_only();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{current_log_file, init_logging, LoggingGuard};

/// Log the start of processing for one batch
///
/// # Example
///
/// ```no_run
/// use batchmerge::log_batch_start;
/// use batchmerge::domain::BatchId;
/// use std::path::Path;
///
/// let batch_id = BatchId::new("BatchOne").unwrap();
/// log_batch_start!(&batch_id, Path::new("/data/BatchOne.zip").display());
/// ```
#[macro_export]
macro_rules! log_batch_start {
    ($batch_id:expr, $archive:expr) => {{
        tracing::info!(
            batch_id = %$batch_id,
            archive = %$archive,
            "Processing batch"
        );
    }};
}

/// Log a batch skipped by the idempotency gate
#[macro_export]
macro_rules! log_batch_skipped {
    ($batch_id:expr, $reason:expr) => {{
        tracing::info!(
            batch_id = %$batch_id,
            reason = $reason,
            "Batch already processed, no changes made"
        );
    }};
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use batchmerge::log_error_with_context;
/// use batchmerge::domain::BatchMergeError;
///
/// let error = BatchMergeError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {{
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    }};
}
