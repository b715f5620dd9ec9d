//! Completion marker for processed batches
//!
//! A small JSON document written into a batch directory once its archive has
//! been fully extracted and its records merged. Under the `marker` gate its
//! presence, not the directory's contents, decides whether a batch counts as
//! processed.

use crate::domain::ids::BatchId;
use crate::domain::{BatchMergeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Completion marker contents
///
/// # Examples
///
/// ```
/// use batchmerge::core::state::marker::CompletionMarker;
/// use batchmerge::domain::BatchId;
///
/// let batch_id = BatchId::new("BatchOne").unwrap();
/// let marker = CompletionMarker::new(batch_id, "BatchOne.zip")
///     .with_rows(42)
///     .with_record_file("candidates.csv");
///
/// assert_eq!(marker.rows_merged, 42);
/// assert!(marker.record_file.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMarker {
    /// Batch this marker belongs to
    pub batch_id: BatchId,

    /// Archive file name the batch was extracted from
    pub archive: String,

    /// Hex SHA-256 of the archive at extraction time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_sha256: Option<String>,

    /// Record file that was augmented, relative to the batch directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_file: Option<String>,

    /// Rows merged into the accumulated dataset
    pub rows_merged: usize,

    /// Entries written during extraction
    pub entries_extracted: usize,

    /// When the batch was completed
    pub completed_at: DateTime<Utc>,

    /// Version of the tool that wrote the marker
    pub tool_version: String,
}

impl CompletionMarker {
    /// Create a marker stamped with the current time
    pub fn new(batch_id: BatchId, archive: impl Into<String>) -> Self {
        Self {
            batch_id,
            archive: archive.into(),
            archive_sha256: None,
            record_file: None,
            rows_merged: 0,
            entries_extracted: 0,
            completed_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the archive checksum
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.archive_sha256 = Some(checksum.into());
        self
    }

    /// Set the augmented record file
    pub fn with_record_file(mut self, record_file: impl Into<String>) -> Self {
        self.record_file = Some(record_file.into());
        self
    }

    /// Set the merged row count
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows_merged = rows;
        self
    }

    /// Set the extracted entry count
    pub fn with_entries(mut self, entries: usize) -> Self {
        self.entries_extracted = entries;
        self
    }

    /// Marker path inside a batch directory
    pub fn path_in(batch_dir: &Path, file_name: &str) -> PathBuf {
        batch_dir.join(file_name)
    }

    /// True when a marker file exists in `batch_dir`
    pub fn exists_in(batch_dir: &Path, file_name: &str) -> bool {
        Self::path_in(batch_dir, file_name).is_file()
    }

    /// Write the marker into `batch_dir`.
    ///
    /// The document is written to a temporary sibling and renamed into place,
    /// so a reader never sees a partial marker.
    pub fn write(&self, batch_dir: &Path, file_name: &str) -> Result<PathBuf> {
        let path = Self::path_in(batch_dir, file_name);
        let tmp = batch_dir.join(format!("{file_name}.tmp"));

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, json)
            .map_err(|e| BatchMergeError::from_io(e, format!("writing {}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| BatchMergeError::from_io(e, format!("renaming {}", tmp.display())))?;

        Ok(path)
    }

    /// Read the marker from `batch_dir`, if present
    ///
    /// # Errors
    ///
    /// Returns [`BatchMergeError::State`] when the file exists but is not a
    /// valid marker.
    pub fn read(batch_dir: &Path, file_name: &str) -> Result<Option<Self>> {
        let path = Self::path_in(batch_dir, file_name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BatchMergeError::from_io(
                    e,
                    format!("reading {}", path.display()),
                ))
            }
        };

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            BatchMergeError::State(format!("Invalid completion marker {}: {}", path.display(), e))
        })
    }
}

/// Hex SHA-256 of a file, streamed in fixed-size blocks
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .map_err(|e| BatchMergeError::from_io(e, format!("opening {}", path.display())))?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| BatchMergeError::from_io(e, format!("reading {}", path.display())))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
