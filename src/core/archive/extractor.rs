//! Archive extraction
//!
//! Extracts every entry of a batch archive into its extraction directory and
//! reports which extracted paths are record-file candidates and which are
//! attachments. Entry names are classified before anything is written, so the
//! lists are complete even when extraction stops part-way.

use crate::config::ArchiveLayout;
use crate::domain::errors::is_connectivity_error;
use crate::domain::{ArchiveError, BatchMergeError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Why extraction of an archive stopped before the last entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// Writing an entry was refused by the filesystem.
    ///
    /// `flagged_file` names the first attachment in the archive, which is the
    /// usual culprit when attachments are locked by a mail client.
    PermissionDenied {
        flagged_file: Option<String>,
        message: String,
    },

    /// Any other platform-level failure while reading or writing an entry
    Platform {
        entry: Option<String>,
        message: String,
    },

    /// The source location dropped away mid-extraction
    Connection { message: String },
}

impl ExtractionFailure {
    /// File named in the warning for this failure
    pub fn flagged_file(&self) -> Option<&str> {
        match self {
            Self::PermissionDenied { flagged_file, .. } => flagged_file.as_deref(),
            Self::Platform { entry, .. } => entry.as_deref(),
            Self::Connection { .. } => None,
        }
    }

    /// Human-readable description
    pub fn message(&self) -> &str {
        match self {
            Self::PermissionDenied { message, .. }
            | Self::Platform { message, .. }
            | Self::Connection { message } => message,
        }
    }
}

/// Outcome of extracting one archive
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Extracted paths of entries carrying the record extension, in archive order
    pub record_files: Vec<PathBuf>,

    /// Extracted paths of attachment entries, in archive order
    pub attachment_files: Vec<PathBuf>,

    /// Entries written to disk
    pub entries_extracted: usize,

    /// Entry names refused because they would land outside the extraction directory
    pub skipped_entries: Vec<String>,

    /// Set when extraction stopped early
    pub failure: Option<ExtractionFailure>,
}

impl ExtractionResult {
    /// True when every entry was written
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Zip extractor for batch archives
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    layout: ArchiveLayout,
}

impl ArchiveExtractor {
    /// Create an extractor classifying entries with `layout`
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    /// True when `name` is a record-file candidate
    pub fn is_record_candidate(&self, name: &str) -> bool {
        !name.ends_with('/') && name.ends_with(&self.layout.record_extension)
    }

    /// True when `name` lies under the attachments directory and carries the
    /// attachment extension
    pub fn is_attachment(&self, name: &str) -> bool {
        if !name.ends_with(&self.layout.attachment_extension) {
            return false;
        }
        let segments: Vec<&str> = name.split(['/', '\\']).collect();
        segments.len() > 1
            && segments[..segments.len() - 1]
                .iter()
                .any(|s| *s == self.layout.attachments_dir)
    }

    /// Extract `archive_path` into `extraction_dir`.
    ///
    /// Per-entry failures do not raise: they stop extraction and are reported
    /// through [`ExtractionResult::failure`], so the caller can still process
    /// whatever landed on disk.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] when the archive cannot be opened or its
    /// central directory is unreadable, and [`BatchMergeError::Connection`]
    /// when opening fails because the source location is gone.
    pub fn extract(&self, archive_path: &Path, extraction_dir: &Path) -> Result<ExtractionResult> {
        let archive_name = archive_path.display().to_string();

        let file = fs::File::open(archive_path).map_err(|e| {
            if is_connectivity_error(&e) {
                BatchMergeError::Connection(format!("Failed to open {archive_name}: {e}"))
            } else {
                ArchiveError::OpenFailed {
                    path: archive_name.clone(),
                    message: e.to_string(),
                }
                .into()
            }
        })?;

        let mut archive = ZipArchive::new(file).map_err(|e| match e {
            ZipError::Io(io_err) if is_connectivity_error(&io_err) => {
                BatchMergeError::Connection(format!("Failed to read {archive_name}: {io_err}"))
            }
            other => ArchiveError::Corrupt {
                path: archive_name.clone(),
                message: other.to_string(),
            }
            .into(),
        })?;

        let names = entry_names(&mut archive, &archive_name)?;

        let mut result = ExtractionResult::default();
        for name in names.iter().filter(|n| is_enclosed(n)) {
            if self.is_record_candidate(name) {
                result.record_files.push(extraction_dir.join(name));
            } else if self.is_attachment(name) {
                result.attachment_files.push(extraction_dir.join(name));
            }
        }

        let first_attachment = names
            .iter()
            .find(|n| is_enclosed(n) && self.is_attachment(n))
            .cloned();

        for index in 0..archive.len() {
            match extract_entry(&mut archive, index, extraction_dir) {
                Ok(EntryOutcome::Written) => result.entries_extracted += 1,
                Ok(EntryOutcome::Directory) => {}
                Ok(EntryOutcome::Unsafe(name)) => {
                    tracing::warn!(
                        archive = %archive_name,
                        entry = %name,
                        "Skipping entry with unsafe path"
                    );
                    result.skipped_entries.push(name);
                }
                Err(EntryError::Io { entry, source }) => {
                    result.failure = Some(classify_io_failure(
                        source,
                        entry,
                        first_attachment.clone(),
                    ));
                    break;
                }
                Err(EntryError::Zip { entry, message }) => {
                    result.failure = Some(ExtractionFailure::Platform {
                        entry,
                        message: ArchiveError::EntryUnreadable {
                            path: archive_name.clone(),
                            index,
                            message,
                        }
                        .to_string(),
                    });
                    break;
                }
            }
        }

        tracing::debug!(
            archive = %archive_name,
            entries = result.entries_extracted,
            record_files = result.record_files.len(),
            attachments = result.attachment_files.len(),
            complete = result.is_complete(),
            "Extraction finished"
        );

        Ok(result)
    }
}

/// True when an entry name stays inside the extraction directory
fn is_enclosed(name: &str) -> bool {
    !name.starts_with(['/', '\\']) && !name.split(['/', '\\']).any(|s| s == "..")
}

enum EntryOutcome {
    Written,
    Directory,
    Unsafe(String),
}

enum EntryError {
    Io {
        entry: Option<String>,
        source: io::Error,
    },
    Zip {
        entry: Option<String>,
        message: String,
    },
}

fn entry_names<R: io::Read + io::Seek>(
    archive: &mut ZipArchive<R>,
    display: &str,
) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|e| ArchiveError::EntryUnreadable {
            path: display.to_string(),
            index,
            message: e.to_string(),
        })?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}

fn extract_entry<R: io::Read + io::Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    extraction_dir: &Path,
) -> std::result::Result<EntryOutcome, EntryError> {
    let mut entry = archive.by_index(index).map_err(|e| match e {
        ZipError::Io(source) => EntryError::Io {
            entry: None,
            source,
        },
        other => EntryError::Zip {
            entry: None,
            message: other.to_string(),
        },
    })?;

    let name = entry.name().to_string();
    let relative = match entry.enclosed_name() {
        Some(path) => path.to_path_buf(),
        None => return Ok(EntryOutcome::Unsafe(name)),
    };
    let target = extraction_dir.join(relative);

    let io_err = |source: io::Error| EntryError::Io {
        entry: Some(name.clone()),
        source,
    };

    if entry.is_dir() {
        fs::create_dir_all(&target).map_err(io_err)?;
        return Ok(EntryOutcome::Directory);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut out = fs::File::create(&target).map_err(io_err)?;
    io::copy(&mut entry, &mut out).map_err(io_err)?;

    Ok(EntryOutcome::Written)
}

fn classify_io_failure(
    source: io::Error,
    entry: Option<String>,
    first_attachment: Option<String>,
) -> ExtractionFailure {
    if is_connectivity_error(&source) {
        return ExtractionFailure::Connection {
            message: source.to_string(),
        };
    }

    match source.kind() {
        io::ErrorKind::PermissionDenied => ExtractionFailure::PermissionDenied {
            flagged_file: first_attachment,
            message: source.to_string(),
        },
        _ => ExtractionFailure::Platform {
            entry,
            message: source.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    fn extractor() -> ArchiveExtractor {
        ArchiveExtractor::new(ArchiveLayout::default())
    }

    #[test]
    fn test_classification_rules() {
        let ex = extractor();
        assert!(ex.is_record_candidate("candidates.csv"));
        assert!(ex.is_record_candidate("reports/summary.csv"));
        assert!(!ex.is_record_candidate("candidates.CSV"));
        assert!(!ex.is_record_candidate("notes.txt"));

        assert!(ex.is_attachment("Attachments/mail.msg"));
        assert!(ex.is_attachment("batch/Attachments/deep/mail.msg"));
        assert!(!ex.is_attachment("mail.msg"));
        assert!(!ex.is_attachment("Attachments.msg"));
        assert!(!ex.is_attachment("Attachments/mail.txt"));
    }

    #[test]
    fn test_extract_classifies_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("BatchOne.zip");
        write_zip(
            &archive,
            &[
                ("candidates.csv", b"candidate_id|name\n1|Al\n"),
                ("Attachments/", b""),
                ("Attachments/a.msg", b"mail a"),
                ("Attachments/b.msg", b"mail b"),
                ("readme.txt", b"hello"),
            ],
        );
        let out = dir.path().join("BatchOne");
        fs::create_dir(&out).unwrap();

        let result = extractor().extract(&archive, &out).unwrap();

        assert!(result.is_complete());
        assert_eq!(result.entries_extracted, 4);
        assert_eq!(result.record_files, vec![out.join("candidates.csv")]);
        assert_eq!(
            result.attachment_files,
            vec![out.join("Attachments/a.msg"), out.join("Attachments/b.msg")]
        );
        assert_eq!(fs::read(out.join("Attachments/b.msg")).unwrap(), b"mail b");
        assert!(out.join("readme.txt").exists());
    }

    #[test]
    fn test_extract_skips_unsafe_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(
            &archive,
            &[("../escape.csv", b"x"), ("candidates.csv", b"candidate_id\n1\n")],
        );
        let out = dir.path().join("evil");
        fs::create_dir(&out).unwrap();

        let result = extractor().extract(&archive, &out).unwrap();

        assert!(result.is_complete());
        assert_eq!(result.skipped_entries, vec!["../escape.csv".to_string()]);
        assert_eq!(result.record_files, vec![out.join("candidates.csv")]);
        assert!(!dir.path().join("escape.csv").exists());
        assert!(out.join("candidates.csv").exists());
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("broken.zip");
        // valid signature, truncated body
        fs::write(&archive, [0x50, 0x4b, 0x03, 0x04, 0x00, 0x00]).unwrap();
        let out = dir.path().join("broken");
        fs::create_dir(&out).unwrap();

        let err = extractor().extract(&archive, &out).unwrap_err();
        assert!(matches!(err, BatchMergeError::Archive(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_extract_empty_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("empty.zip");
        write_zip(&archive, &[]);
        let out = dir.path().join("empty");
        fs::create_dir(&out).unwrap();

        let result = extractor().extract(&archive, &out).unwrap();
        assert!(result.is_complete());
        assert_eq!(result.entries_extracted, 0);
        assert!(result.record_files.is_empty());
    }

    #[test]
    fn test_extract_stops_on_write_failure() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("clash.zip");
        write_zip(
            &archive,
            &[
                ("candidates.csv", b"candidate_id\n1\n"),
                ("Attachments/a.msg", b"mail"),
                ("Attachments/b.msg", b"mail"),
            ],
        );
        let out = dir.path().join("clash");
        fs::create_dir(&out).unwrap();
        // a file where the attachments directory must go
        fs::write(out.join("Attachments"), b"blocker").unwrap();

        let result = extractor().extract(&archive, &out).unwrap();

        let failure = result.failure.clone().unwrap();
        assert!(matches!(failure, ExtractionFailure::Platform { .. }));
        assert_eq!(failure.flagged_file(), Some("Attachments/a.msg"));
        assert_eq!(result.entries_extracted, 1);
        // classification still lists every entry
        assert_eq!(result.attachment_files.len(), 2);
        assert!(out.join("candidates.csv").exists());
    }

    #[test]
    fn test_permission_failure_flags_first_attachment() {
        let failure = classify_io_failure(
            io::Error::new(io::ErrorKind::PermissionDenied, "locked"),
            Some("Attachments/b.msg".to_string()),
            Some("Attachments/a.msg".to_string()),
        );
        assert_eq!(failure.flagged_file(), Some("Attachments/a.msg"));
        assert!(matches!(failure, ExtractionFailure::PermissionDenied { .. }));
    }

    #[test]
    fn test_network_failure_is_connection() {
        let failure = classify_io_failure(
            io::Error::new(io::ErrorKind::ConnectionReset, "share gone"),
            None,
            None,
        );
        assert!(matches!(failure, ExtractionFailure::Connection { .. }));
        assert_eq!(failure.flagged_file(), None);
    }
}
