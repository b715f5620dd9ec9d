//! Batch state tracking
//!
//! The extraction directory of a batch doubles as its processed flag. The
//! tracker decides, per batch, whether the archive still needs work and
//! claims the directory when it does.

use super::marker::CompletionMarker;
use crate::config::GateMode;
use crate::domain::errors::is_connectivity_error;
use crate::domain::ids::BatchId;
use crate::domain::{BatchMergeError, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// State of a batch directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// No directory yet (only reported by [`BatchStateTracker::inspect`])
    Missing,
    /// Directory was created by this call
    Created,
    /// Directory exists with no contents
    Empty,
    /// Directory has contents but no completion marker (`marker` gate only)
    Incomplete,
    /// Batch counts as processed
    Processed,
}

impl BatchState {
    /// True when the batch must be extracted and merged
    pub fn needs_processing(self) -> bool {
        !matches!(self, BatchState::Processed)
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchState::Missing => "pending",
            BatchState::Created => "created",
            BatchState::Empty => "empty",
            BatchState::Incomplete => "incomplete",
            BatchState::Processed => "processed",
        };
        f.write_str(s)
    }
}

/// Result of checking one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResolution {
    /// Batch directory path
    pub extraction_dir: PathBuf,
    /// Batch state
    pub state: BatchState,
}

impl BatchResolution {
    /// True when the batch was already processed by an earlier run
    pub fn already_processed(&self) -> bool {
        self.state == BatchState::Processed
    }
}

/// Idempotency gate over batch directories
#[derive(Debug, Clone)]
pub struct BatchStateTracker {
    source_dir: PathBuf,
    gate: GateMode,
    marker_file_name: String,
}

impl BatchStateTracker {
    /// Create a tracker for batch directories under `source_dir`
    pub fn new(
        source_dir: impl Into<PathBuf>,
        gate: GateMode,
        marker_file_name: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            gate,
            marker_file_name: marker_file_name.into(),
        }
    }

    /// Directory a batch extracts into
    pub fn extraction_dir(&self, batch_id: &BatchId) -> PathBuf {
        self.source_dir.join(batch_id.as_str())
    }

    /// Gate in effect
    pub fn gate(&self) -> GateMode {
        self.gate
    }

    /// Resolve a batch, creating its directory when absent.
    ///
    /// Creation is attempted first and `AlreadyExists` falls through to the
    /// contents check, so two racing runs never both see `Created`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchMergeError::Connection`] when the source directory has
    /// gone away, and [`BatchMergeError::State`] for any other failure to
    /// create or list the directory.
    pub fn resolve(&self, batch_id: &BatchId) -> Result<BatchResolution> {
        let dir = self.extraction_dir(batch_id);

        match fs::create_dir(&dir) {
            Ok(()) => {
                tracing::debug!(batch_id = %batch_id, dir = %dir.display(), "Created batch directory");
                Ok(BatchResolution {
                    extraction_dir: dir,
                    state: BatchState::Created,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let state = self.existing_state(batch_id, &dir)?;
                Ok(BatchResolution {
                    extraction_dir: dir,
                    state,
                })
            }
            Err(e) => Err(self.state_error(e, &dir)),
        }
    }

    /// Resolve a batch without creating anything
    pub fn inspect(&self, batch_id: &BatchId) -> Result<BatchResolution> {
        let dir = self.extraction_dir(batch_id);

        let state = match fs::metadata(&dir) {
            Ok(_) => self.existing_state(batch_id, &dir)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BatchState::Missing,
            Err(e) => return Err(self.state_error(e, &dir)),
        };

        Ok(BatchResolution {
            extraction_dir: dir,
            state,
        })
    }

    fn existing_state(&self, batch_id: &BatchId, dir: &Path) -> Result<BatchState> {
        let empty = is_dir_empty(dir).map_err(|e| self.state_error(e, dir))?;

        let state = match self.gate {
            GateMode::NonEmptyDir if empty => BatchState::Empty,
            GateMode::NonEmptyDir => BatchState::Processed,
            GateMode::Marker if CompletionMarker::exists_in(dir, &self.marker_file_name) => {
                BatchState::Processed
            }
            GateMode::Marker if empty => BatchState::Empty,
            GateMode::Marker => {
                tracing::warn!(
                    batch_id = %batch_id,
                    dir = %dir.display(),
                    "Batch directory has contents but no completion marker, re-extracting"
                );
                BatchState::Incomplete
            }
        };

        Ok(state)
    }

    fn state_error(&self, err: io::Error, dir: &Path) -> BatchMergeError {
        if is_connectivity_error(&err) || !self.source_dir.is_dir() {
            BatchMergeError::Connection(format!(
                "Source directory {} is unreachable: {}",
                self.source_dir.display(),
                err
            ))
        } else {
            BatchMergeError::State(format!(
                "Failed to prepare batch directory {}: {}",
                dir.display(),
                err
            ))
        }
    }
}

/// True when `dir` has no entries
fn is_dir_empty(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
