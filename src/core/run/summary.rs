//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting run results.

use crate::domain::BatchErrorDetail;
use std::time::Duration;

/// Summary of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Archives yielded by the scanner
    pub archives_found: usize,

    /// Batches extracted and merged during this run
    pub batches_processed: usize,

    /// Batches skipped because an earlier run processed them
    pub batches_skipped: usize,

    /// Batches that failed before any records were merged
    pub batches_failed: usize,

    /// Rows loaded from the existing master file
    pub rows_seeded: usize,

    /// Rows merged from batches during this run
    pub rows_merged: usize,

    /// Rows written to the master file
    pub rows_exported: usize,

    /// Batches that would be processed (dry run only)
    pub pending_batches: Vec<String>,

    /// Per-batch problems, including extraction warnings
    pub warnings: Vec<BatchErrorDetail>,

    /// True when a shutdown request stopped the run early
    pub interrupted: bool,

    /// True for a dry run
    pub dry_run: bool,

    /// Duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self {
            archives_found: 0,
            batches_processed: 0,
            batches_skipped: 0,
            batches_failed: 0,
            rows_seeded: 0,
            rows_merged: 0,
            rows_exported: 0,
            pending_batches: Vec::new(),
            warnings: Vec::new(),
            interrupted: false,
            dry_run: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a per-batch warning
    pub fn add_warning(&mut self, warning: BatchErrorDetail) {
        self.warnings.push(warning);
    }

    /// Check if the run completed without failed batches or warnings
    pub fn is_successful(&self) -> bool {
        self.batches_failed == 0 && self.warnings.is_empty() && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            archives_found = self.archives_found,
            processed = self.batches_processed,
            skipped = self.batches_skipped,
            failed = self.batches_failed,
            rows_seeded = self.rows_seeded,
            rows_merged = self.rows_merged,
            rows_exported = self.rows_exported,
            duration_secs = self.duration.as_secs(),
            dry_run = self.dry_run,
            "Run completed"
        );

        if self.interrupted {
            tracing::warn!("Run was interrupted before all archives were processed");
        }

        if !self.warnings.is_empty() {
            tracing::warn!(
                warning_count = self.warnings.len(),
                "Run completed with warnings"
            );
            for warning in &self.warnings {
                tracing::warn!(
                    batch_id = warning.batch_id.as_deref().unwrap_or("-"),
                    flagged_file = warning.flagged_file.as_deref().unwrap_or("-"),
                    message = %warning.message,
                    "Batch warning"
                );
            }
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
