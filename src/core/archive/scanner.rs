//! Batch directory scanner
//!
//! Enumerates the archives sitting directly in the source directory. A child
//! qualifies when its name carries the archive suffix and it reads as a zip:
//! either its first bytes are a zip signature or a central directory can be
//! found behind leading data (self-extracting archives). Subdirectories
//! (including produced batch directories) and any other file are skipped.

use crate::domain::{BatchMergeError, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Local file header signature, the first bytes of any non-empty zip
const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// End of central directory signature, the first bytes of an empty zip
const ZIP_EMPTY_ARCHIVE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

/// Scanner over a source directory
#[derive(Debug, Clone)]
pub struct BatchScanner {
    source_dir: PathBuf,
    archive_suffix: String,
}

impl BatchScanner {
    /// Create a scanner for `source_dir` accepting names ending in `archive_suffix`
    pub fn new(source_dir: impl Into<PathBuf>, archive_suffix: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            archive_suffix: archive_suffix.into(),
        }
    }

    /// Source directory being scanned
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Start a new pass over the source directory.
    ///
    /// The directory listing is taken eagerly and sorted by file name; the
    /// content signature of each candidate is checked lazily as the returned
    /// iterator is consumed. Calling `scan` again restarts from a fresh listing.
    ///
    /// # Errors
    ///
    /// Returns [`BatchMergeError::Connection`] when the source directory cannot
    /// be listed.
    pub fn scan(&self) -> Result<ArchiveIter> {
        let entries = fs::read_dir(&self.source_dir).map_err(|e| {
            BatchMergeError::Connection(format!(
                "Failed to list source directory {}: {}",
                self.source_dir.display(),
                e
            ))
        })?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                BatchMergeError::Connection(format!(
                    "Failed to read source directory {}: {}",
                    self.source_dir.display(),
                    e
                ))
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(&self.archive_suffix) {
                candidates.push(entry.path());
            }
        }
        candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::debug!(
            source_dir = %self.source_dir.display(),
            candidates = candidates.len(),
            "Listed archive candidates"
        );

        Ok(ArchiveIter {
            candidates: candidates.into_iter(),
        })
    }
}

/// Lazy sequence of archive paths produced by [`BatchScanner::scan`]
#[derive(Debug)]
pub struct ArchiveIter {
    candidates: std::vec::IntoIter<PathBuf>,
}

impl Iterator for ArchiveIter {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.candidates.by_ref() {
            if has_zip_signature(&path) {
                return Some(path);
            }
            tracing::debug!(path = %path.display(), "Skipping non-archive file");
        }
        None
    }
}

/// True when `path` is a regular file that reads as a zip archive.
///
/// The leading signature is the fast path. Files with data in front of the
/// archive (self-extracting stubs) fall back to locating the central directory.
pub fn has_zip_signature(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    let mut magic = [0u8; 4];
    let leading = fs::File::open(path).and_then(|mut f| f.read_exact(&mut magic));
    if leading.is_ok() && (magic == ZIP_LOCAL_HEADER || magic == ZIP_EMPTY_ARCHIVE) {
        return true;
    }

    fs::File::open(path)
        .map(|f| ZipArchive::new(f).is_ok())
        .unwrap_or(false)
}
