//! Structured logging setup using tracing
//!
//! This module provides console logging plus an optional log file under the
//! source directory, in text or JSON lines, with daily or no rotation.
//!
//! # Example
//!
//! ```no_run
//! use batchmerge::logging::init_logging;
//! use batchmerge::config::LoggingConfig;
//!
//! let config = LoggingConfig::console_only();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{BatchMergeError, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system based on configuration
///
/// This function sets up:
/// - A console layer (always enabled)
/// - A file layer under `config.local_path` when `local_enabled` is set
///
/// # Arguments
///
/// * `log_level_str` - Log level as a string (trace, debug, info, warn, error)
/// * `config` - Logging configuration with `local_path` already resolved
///
/// # Returns
///
/// A `LoggingGuard` that must be kept alive until the process exits; dropping
/// it flushes the file writer.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("batchmerge={}", log_level)));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter.clone());
    layers.push(console_layer.boxed());

    let file_guard = if config.local_enabled {
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            BatchMergeError::Configuration(format!(
                "Failed to create log directory {}: {}",
                config.local_path, e
            ))
        })?;

        let file_appender = match config.local_rotation.as_str() {
            "never" => RollingFileAppender::new(
                Rotation::NEVER,
                &config.local_path,
                format!("{}.log", config.file_prefix),
            ),
            _ => RollingFileAppender::new(Rotation::DAILY, &config.local_path, &config.file_prefix),
        };
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = if config.format == "json" {
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(non_blocking)
                .with_filter(env_filter)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(non_blocking)
                .with_filter(env_filter)
                .boxed()
        };

        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| {
            BatchMergeError::Configuration(format!("Failed to install log subscriber: {e}"))
        })?;

    tracing::info!(
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

/// Path of the log file written today for this configuration
pub fn current_log_file(config: &LoggingConfig) -> PathBuf {
    let dir = PathBuf::from(&config.local_path);
    match config.local_rotation.as_str() {
        "never" => dir.join(format!("{}.log", config.file_prefix)),
        _ => dir.join(format!(
            "{}.{}",
            config.file_prefix,
            chrono::Utc::now().format("%Y-%m-%d")
        )),
    }
}

/// Parse log level from string
fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(BatchMergeError::Configuration(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))),
    }
}
