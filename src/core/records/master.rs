//! Master file load and export
//!
//! The master file holds every merged record, sorted by candidate then batch.
//! It is loaded once to seed a run and rewritten once at the end.

use super::augment::temp_sibling;
use super::codec::{read_table, write_table, CodecError};
use crate::config::BatchMergeConfig;
use crate::domain::{BatchMergeError, RecordTable, Result};
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Master file settings and operations
#[derive(Debug, Clone)]
pub struct MasterFile {
    path: PathBuf,
    delimiter: u8,
    candidate_column: String,
    batch_column: String,
    chunk_size: usize,
}

impl MasterFile {
    /// Master file described by `config`
    pub fn from_config(config: &BatchMergeConfig) -> Self {
        Self {
            path: config.master_path(),
            delimiter: config.source.delimiter_byte(),
            candidate_column: config.merge.candidate_column.clone(),
            batch_column: config.merge.batch_column.clone(),
            chunk_size: config.merge.chunk_size,
        }
    }

    /// Location of the master file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the master file.
    ///
    /// A missing file yields an empty table.
    ///
    /// # Errors
    ///
    /// Any other read or parse failure is returned; seeding from a master
    /// that exists but cannot be read would lose its rows on export.
    pub fn load(&self) -> Result<RecordTable> {
        match read_table(&self.path, self.delimiter) {
            Ok(table) => {
                tracing::info!(
                    path = %self.path.display(),
                    rows = table.len(),
                    "Loaded master file"
                );
                Ok(table)
            }
            Err(CodecError::Open(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No master file yet, starting empty");
                Ok(RecordTable::default())
            }
            Err(CodecError::Open(e)) => Err(BatchMergeError::from_io(
                e,
                format!("opening master file {}", self.path.display()),
            )),
            Err(CodecError::Record(e)) => Err(e.into()),
        }
    }

    /// Sort `dataset` and write it to the master file.
    ///
    /// The file is written to a `.tmp` sibling in chunks and renamed over the
    /// master, so an interrupted export leaves the previous master intact. A
    /// dataset with no columns is not written. Returns the rows written.
    pub fn export(&self, dataset: &mut RecordTable) -> Result<usize> {
        if dataset.headers().is_empty() {
            tracing::info!("Accumulated dataset has no columns, master file not written");
            return Ok(0);
        }

        self.sort(dataset)?;

        let tmp = temp_sibling(&self.path);
        let written = write_table(&tmp, dataset, self.delimiter, self.chunk_size)
            .map_err(|e| BatchMergeError::Export(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            BatchMergeError::Export(format!(
                "Failed to replace master file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %self.path.display(),
            rows = written,
            "Master file written"
        );
        Ok(written)
    }

    /// Stable sort by candidate column, then batch column
    pub fn sort(&self, dataset: &mut RecordTable) -> Result<()> {
        let candidate = dataset.column_index(&self.candidate_column).ok_or_else(|| {
            BatchMergeError::Export(format!(
                "Accumulated dataset has no '{}' column",
                self.candidate_column
            ))
        })?;
        let batch = dataset.column_index(&self.batch_column);

        dataset.rows_mut().sort_by(|a, b| {
            compare_cells(&a[candidate], &b[candidate]).then_with(|| match batch {
                Some(idx) => compare_cells(&a[idx], &b[idx]),
                None => Ordering::Equal,
            })
        });
        Ok(())
    }
}

/// Order two cells: numbers first in numeric order, then text in byte
/// order, then empty cells.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (cell_rank(a), cell_rank(b)) {
        (CellRank::Number(x), CellRank::Number(y)) => x.total_cmp(&y),
        (CellRank::Text, CellRank::Text) => a.cmp(b),
        (ra, rb) => ra.order().cmp(&rb.order()),
    }
}

enum CellRank {
    Number(f64),
    Text,
    Empty,
}

impl CellRank {
    fn order(&self) -> u8 {
        match self {
            CellRank::Number(_) => 0,
            CellRank::Text => 1,
            CellRank::Empty => 2,
        }
    }
}

fn cell_rank(cell: &str) -> CellRank {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return CellRank::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellRank::Number(n),
        _ => CellRank::Text,
    }
}
