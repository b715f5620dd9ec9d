//! Domain error types
//!
//! This module defines the error hierarchy for batchmerge.
//! All errors are domain-specific and don't expose third-party types.

use std::io;
use thiserror::Error;

/// Main batchmerge error type
///
/// This is the primary error type used throughout the application.
/// Variants are split into per-batch failures, which the run loop contains,
/// and fatal faults, which stop the run (see [`BatchMergeError::is_fatal`]).
#[derive(Debug, Error)]
pub enum BatchMergeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Archive-related errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Record file errors
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Batch state errors (directory creation, marker persistence)
    #[error("State management error: {0}")]
    State(String),

    /// Master file export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Loss of access to the source location
    #[error("Connection error: {0}")]
    Connection(String),

    /// Unexpected internal failure
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl BatchMergeError {
    /// Whether this error must stop the run.
    ///
    /// Only connectivity and runtime faults are fatal; everything else is
    /// contained to the batch that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Runtime(_))
    }

    /// Wraps an I/O error raised while touching `context`, promoting network
    /// error kinds to [`BatchMergeError::Connection`].
    pub fn from_io(err: io::Error, context: impl AsRef<str>) -> Self {
        let message = format!("{}: {}", context.as_ref(), err);
        if is_connectivity_error(&err) {
            Self::Connection(message)
        } else {
            Self::Io(message)
        }
    }
}

/// Returns true for I/O error kinds that indicate the source location dropped
/// away (network shares, remote mounts).
pub fn is_connectivity_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
    )
}

/// Archive-specific errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Archive file could not be opened
    #[error("Failed to open archive {path}: {message}")]
    OpenFailed { path: String, message: String },

    /// Archive central directory is invalid
    #[error("Invalid or corrupt zip archive {path}: {message}")]
    Corrupt { path: String, message: String },

    /// A single entry could not be read
    #[error("Failed to read entry {index} of {path}: {message}")]
    EntryUnreadable {
        path: String,
        index: usize,
        message: String,
    },
}

/// Record file errors
#[derive(Debug, Error)]
pub enum RecordError {
    /// Record file could not be read
    #[error("Failed to read record file {path}: {message}")]
    ReadFailed { path: String, message: String },

    /// Record file could not be written
    #[error("Failed to write record file {path}: {message}")]
    WriteFailed { path: String, message: String },

    /// Malformed delimited content
    #[error("Malformed record file {path}: {message}")]
    Malformed { path: String, message: String },

    /// Required column absent from the header row
    #[error("Record file {path} has no '{column}' column")]
    MissingColumn { path: String, column: String },
}

/// Per-batch problem recorded in the run summary
///
/// Provides additional context for a batch that was skipped or only
/// partially processed.
#[derive(Debug, Clone)]
pub struct BatchErrorDetail {
    /// Batch identifier associated with the error
    pub batch_id: Option<String>,

    /// Archive path associated with the error
    pub archive: Option<String>,

    /// File inside the batch implicated by the error
    pub flagged_file: Option<String>,

    /// Error message
    pub message: String,
}

impl BatchErrorDetail {
    /// Creates a new batch error detail
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            batch_id: None,
            archive: None,
            flagged_file: None,
            message: message.into(),
        }
    }

    /// Sets the batch ID
    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Sets the archive path
    pub fn with_archive(mut self, archive: impl Into<String>) -> Self {
        self.archive = Some(archive.into());
        self
    }

    /// Sets the implicated file
    pub fn with_flagged_file(mut self, file: impl Into<String>) -> Self {
        self.flagged_file = Some(file.into());
        self
    }
}

// Conversion from std::io::Error
impl From<io::Error> for BatchMergeError {
    fn from(err: io::Error) -> Self {
        if is_connectivity_error(&err) {
            BatchMergeError::Connection(err.to_string())
        } else {
            BatchMergeError::Io(err.to_string())
        }
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BatchMergeError {
    fn from(err: serde_json::Error) -> Self {
        BatchMergeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BatchMergeError {
    fn from(err: toml::de::Error) -> Self {
        BatchMergeError::Configuration(format!("TOML parse error: {err}"))
    }
}
