//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for batch identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Separator substituted for whitespace in archive names.
pub const BATCH_ID_SEPARATOR: char = '_';

/// Batch identifier newtype wrapper
///
/// Derived from an archive's base name (file name without its final
/// extension) with every whitespace character replaced by `_`. The batch
/// identifier doubles as the extraction directory name and as the value of
/// the batch column written into every record.
///
/// # Examples
///
/// ```
/// use batchmerge::domain::ids::BatchId;
/// use std::path::Path;
///
/// let batch_id = BatchId::from_archive_path(Path::new("/data/RM Export 0.zip")).unwrap();
/// assert_eq!(batch_id.as_str(), "RM_Export_0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(String);

impl BatchId {
    /// Creates a new BatchId, normalizing whitespace
    ///
    /// # Arguments
    ///
    /// * `id` - The raw batch name
    ///
    /// # Returns
    ///
    /// Returns `Ok(BatchId)` if the ID is usable as a directory name, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Batch ID cannot be empty".to_string());
        }
        if id.contains('/') || id.contains('\\') || id == "." || id == ".." {
            return Err(format!("Batch ID cannot be used as a directory name: {id}"));
        }

        let normalized: String = id
            .chars()
            .map(|c| {
                if c.is_whitespace() {
                    BATCH_ID_SEPARATOR
                } else {
                    c
                }
            })
            .collect();

        Ok(Self(normalized))
    }

    /// Derives the batch ID from an archive path
    pub fn from_archive_path(path: &Path) -> Result<Self, String> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| format!("Archive path has no file name: {}", path.display()))?;
        Self::new(stem)
    }

    /// Returns the batch ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
