//! Accumulated dataset
//!
//! Holds the union of the seeded master and every batch merged during a run.

use crate::domain::RecordTable;

/// Merge accumulator for one run
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    dataset: RecordTable,
    batches_merged: usize,
    rows_merged: usize,
}

impl Accumulator {
    /// Start from a seed, typically the existing master file
    pub fn new(seed: RecordTable) -> Self {
        Self {
            dataset: seed,
            batches_merged: 0,
            rows_merged: 0,
        }
    }

    /// Merge one batch's records.
    ///
    /// `None` and empty tables leave the dataset unchanged. When the dataset
    /// has no rows yet the incoming table replaces it, so its column order
    /// wins; otherwise rows are appended with columns matched by name.
    ///
    /// Returns the number of rows added.
    pub fn merge(&mut self, records: Option<RecordTable>) -> usize {
        let table = match records {
            Some(table) if !table.is_empty() => table,
            _ => return 0,
        };

        let added = table.len();
        if self.dataset.is_empty() {
            self.dataset = table;
        } else {
            self.dataset.append(table);
        }

        self.batches_merged += 1;
        self.rows_merged += added;
        added
    }

    /// Accumulated rows and columns
    pub fn dataset(&self) -> &RecordTable {
        &self.dataset
    }

    /// Mutable dataset, for sorting before export
    pub fn dataset_mut(&mut self) -> &mut RecordTable {
        &mut self.dataset
    }

    /// Rows currently held
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// True when no rows are held
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Batches that contributed rows during this run
    pub fn batches_merged(&self) -> usize {
        self.batches_merged
    }

    /// Rows added during this run
    pub fn rows_merged(&self) -> usize {
        self.rows_merged
    }
}
