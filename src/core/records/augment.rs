//! Record augmentation
//!
//! Finds the canonical record file among a batch's extracted record
//! candidates, stamps every row with the batch identifier and rewrites the
//! file in place.

use super::codec::{read_table, write_table, CodecError};
use crate::config::{MergeConfig, SourceConfig};
use crate::domain::ids::BatchId;
use crate::domain::{BatchMergeError, RecordError, RecordTable, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A record file after augmentation
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedRecords {
    /// Rewritten file
    pub path: PathBuf,
    /// Table as written, batch column included
    pub table: RecordTable,
}

/// Adds the batch column to a batch's record file
#[derive(Debug, Clone)]
pub struct RecordAugmenter {
    record_file_name: String,
    candidate_column: String,
    batch_column: String,
    delimiter: u8,
    chunk_size: usize,
}

impl RecordAugmenter {
    /// Create an augmenter from the source and merge settings
    pub fn new(source: &SourceConfig, merge: &MergeConfig) -> Self {
        Self {
            record_file_name: source.record_file_name.clone(),
            candidate_column: merge.candidate_column.clone(),
            batch_column: merge.batch_column.clone(),
            delimiter: source.delimiter_byte(),
            chunk_size: merge.chunk_size,
        }
    }

    /// First candidate whose file name is exactly the record file name
    pub fn locate<'a>(&self, record_files: &'a [PathBuf]) -> Option<&'a PathBuf> {
        record_files.iter().find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy() == self.record_file_name.as_str())
                .unwrap_or(false)
        })
    }

    /// Augment the batch's record file, if it has one.
    ///
    /// Returns `Ok(None)` when no candidate carries the record file name, or
    /// when the located file never made it to disk because extraction stopped
    /// early.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] when the file cannot be read, lacks the
    /// candidate column, or cannot be rewritten. The file is left untouched
    /// in the first two cases.
    pub fn augment(
        &self,
        record_files: &[PathBuf],
        batch_id: &BatchId,
    ) -> Result<Option<AugmentedRecords>> {
        let path = match self.locate(record_files) {
            Some(path) => path,
            None => {
                tracing::debug!(batch_id = %batch_id, "Batch has no record file");
                return Ok(None);
            }
        };

        let mut table = match read_table(path, self.delimiter) {
            Ok(table) => table,
            Err(CodecError::Open(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    batch_id = %batch_id,
                    path = %path.display(),
                    "Record file listed in archive was not extracted"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into_record_error(path).into()),
        };

        if table.column_index(&self.candidate_column).is_none() {
            return Err(RecordError::MissingColumn {
                path: path.display().to_string(),
                column: self.candidate_column.clone(),
            }
            .into());
        }

        table.set_column(&self.batch_column, batch_id.as_str());
        self.rewrite(path, &table)?;

        tracing::debug!(
            batch_id = %batch_id,
            path = %path.display(),
            rows = table.len(),
            "Record file augmented"
        );

        Ok(Some(AugmentedRecords {
            path: path.clone(),
            table,
        }))
    }

    fn rewrite(&self, path: &Path, table: &RecordTable) -> Result<()> {
        let tmp = temp_sibling(path);
        write_table(&tmp, table, self.delimiter, self.chunk_size)?;
        fs::rename(&tmp, path)
            .map_err(|e| BatchMergeError::from_io(e, format!("replacing {}", path.display())))
    }
}

/// `<name>.tmp` next to `path`
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn augmenter() -> RecordAugmenter {
        RecordAugmenter::new(&SourceConfig::default(), &MergeConfig::default())
    }

    fn batch() -> BatchId {
        BatchId::new("BatchOne").unwrap()
    }

    #[test]
    fn test_locate_requires_exact_name() {
        let files = vec![
            PathBuf::from("/b/old_candidates.csv"),
            PathBuf::from("/b/sub/candidates.csv"),
            PathBuf::from("/b/candidates.csv"),
        ];
        assert_eq!(
            augmenter().locate(&files),
            Some(&PathBuf::from("/b/sub/candidates.csv"))
        );
        assert_eq!(augmenter().locate(&files[..1]), None);
    }

    #[test]
    fn test_augment_adds_batch_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.csv");
        fs::write(&path, "candidate_id|name\n1|Al\n2|Bo\n").unwrap();

        let augmented = augmenter()
            .augment(&[path.clone()], &batch())
            .unwrap()
            .unwrap();

        assert_eq!(augmented.table.len(), 2);
        assert_eq!(
            augmented.table.column_values("batch_id").unwrap(),
            vec!["BatchOne", "BatchOne"]
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "candidate_id|name|batch_id\n1|Al|BatchOne\n2|Bo|BatchOne\n"
        );
        assert!(!dir.path().join("candidates.csv.tmp").exists());
    }

    #[test]
    fn test_augment_overwrites_existing_batch_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.csv");
        fs::write(&path, "candidate_id|batch_id\n1|stale\n").unwrap();

        let augmented = augmenter().augment(&[path], &batch()).unwrap().unwrap();
        assert_eq!(augmented.table.headers(), &["candidate_id", "batch_id"]);
        assert_eq!(augmented.table.value(0, "batch_id"), Some("BatchOne"));
    }

    #[test]
    fn test_augment_header_only_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.csv");
        fs::write(&path, "candidate_id|name\n").unwrap();

        let augmented = augmenter().augment(&[path.clone()], &batch()).unwrap().unwrap();
        assert!(augmented.table.is_empty());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "candidate_id|name|batch_id\n"
        );
    }

    #[test]
    fn test_augment_missing_candidate_column_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.csv");
        fs::write(&path, "id|name\n1|Al\n").unwrap();

        let err = augmenter().augment(&[path.clone()], &batch()).unwrap_err();
        assert!(matches!(
            err,
            BatchMergeError::Record(RecordError::MissingColumn { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "id|name\n1|Al\n");
    }

    #[test]
    fn test_augment_without_record_file() {
        let result = augmenter()
            .augment(&[PathBuf::from("/b/other.csv")], &batch())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_augment_unextracted_record_file() {
        let dir = TempDir::new().unwrap();
        let result = augmenter()
            .augment(&[dir.path().join("candidates.csv")], &batch())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_temp_sibling() {
        assert_eq!(
            temp_sibling(Path::new("/data/master_candidates.csv")),
            PathBuf::from("/data/master_candidates.csv.tmp")
        );
    }
}
