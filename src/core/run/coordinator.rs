//! Run coordination
//!
//! Drives one pass over the source directory: every archive the scanner
//! yields goes through the state gate, extraction, augmentation and merge, in
//! that order. The accumulated dataset is exported exactly once at the end.

use super::session::RunSession;
use super::summary::RunSummary;
use crate::config::BatchMergeConfig;
use crate::core::archive::{ArchiveExtractor, BatchScanner, ExtractionFailure, ExtractionResult};
use crate::core::records::{Accumulator, MasterFile, RecordAugmenter};
use crate::core::state::{file_checksum, BatchState, BatchStateTracker, CompletionMarker};
use crate::domain::ids::BatchId;
use crate::domain::{BatchErrorDetail, BatchMergeError, Result};
use crate::{log_batch_skipped, log_batch_start, log_error_with_context};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::watch;

/// Run coordinator
pub struct RunCoordinator {
    config: BatchMergeConfig,
    scanner: BatchScanner,
    tracker: BatchStateTracker,
    extractor: ArchiveExtractor,
    augmenter: RecordAugmenter,
    master: MasterFile,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl RunCoordinator {
    /// Create a coordinator for a validated configuration
    pub fn new(config: BatchMergeConfig) -> Self {
        let scanner = BatchScanner::new(&config.source.directory, &config.source.archive_suffix);
        let tracker = BatchStateTracker::new(
            &config.source.directory,
            config.state.gate,
            &config.state.marker_file_name,
        );
        let extractor = ArchiveExtractor::new(config.source.layout());
        let augmenter = RecordAugmenter::new(&config.source, &config.merge);
        let master = MasterFile::from_config(&config);

        Self {
            config,
            scanner,
            tracker,
            extractor,
            augmenter,
            master,
            shutdown_signal: None,
        }
    }

    /// Stop between batches once `shutdown_signal` turns true
    pub fn with_shutdown_signal(mut self, shutdown_signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    /// Execute one run.
    ///
    /// Per-batch failures are logged, recorded in the summary and skipped.
    /// A fatal error (see [`BatchMergeError::is_fatal`]) stops the loop; the
    /// dataset accumulated so far is still exported while the session unwinds.
    ///
    /// # Errors
    ///
    /// Returns fatal errors, a failure to read an existing master file, and
    /// a failure to write the master file.
    pub fn execute_run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let dry_run = self.config.application.dry_run;
        let mut summary = RunSummary::new();
        summary.dry_run = dry_run;

        tracing::info!(
            source_dir = %self.config.source.directory.display(),
            gate = %self.config.state.gate,
            dry_run,
            "Starting run"
        );

        self.ensure_source_reachable()?;

        let mut session = RunSession::open(self.master.clone(), !dry_run)?;
        summary.rows_seeded = session.accumulator().len();

        for archive in self.scanner.scan()? {
            if self.is_shutdown_requested() {
                tracing::warn!("Shutdown requested, stopping before next batch");
                summary.interrupted = true;
                break;
            }
            self.ensure_source_reachable()?;

            summary.archives_found += 1;
            if let Err(e) =
                self.process_archive(&archive, session.accumulator_mut(), &mut summary)
            {
                if e.is_fatal() {
                    tracing::error!(
                        archive = %archive.display(),
                        error = %e,
                        "Fatal error, stopping run"
                    );
                    return Err(e);
                }

                log_error_with_context!(&e, "Failed to process batch");
                summary.batches_failed += 1;
                let mut detail =
                    BatchErrorDetail::new(e.to_string()).with_archive(archive.display().to_string());
                if let Ok(batch_id) = BatchId::from_archive_path(&archive) {
                    detail = detail.with_batch_id(batch_id.into_inner());
                }
                summary.add_warning(detail);
            }
        }

        summary.rows_exported = session.finish()?;

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }

    fn process_archive(
        &self,
        archive: &Path,
        accumulator: &mut Accumulator,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let batch_id = BatchId::from_archive_path(archive).map_err(BatchMergeError::State)?;
        log_batch_start!(&batch_id, archive.display());

        if self.config.application.dry_run {
            let resolution = self.tracker.inspect(&batch_id)?;
            if resolution.already_processed() {
                log_batch_skipped!(&batch_id, "processed");
                summary.batches_skipped += 1;
            } else {
                tracing::info!(
                    batch_id = %batch_id,
                    state = %resolution.state,
                    "Dry run, batch would be processed"
                );
                summary.pending_batches.push(batch_id.into_inner());
            }
            return Ok(());
        }

        let resolution = self.tracker.resolve(&batch_id)?;
        if resolution.already_processed() {
            log_batch_skipped!(&batch_id, "processed");
            summary.batches_skipped += 1;
            return Ok(());
        }
        if resolution.state == BatchState::Incomplete {
            tracing::info!(batch_id = %batch_id, "Resuming incomplete batch");
        }

        let extraction = self.extractor.extract(archive, &resolution.extraction_dir)?;
        let (record_file, rows) =
            self.merge_extraction(&batch_id, archive, &extraction, accumulator, summary)?;
        summary.batches_processed += 1;
        summary.rows_merged += rows;

        tracing::info!(
            batch_id = %batch_id,
            rows,
            entries = extraction.entries_extracted,
            "Batch merged"
        );

        if self.config.state.write_marker && extraction.is_complete() {
            let mut marker = CompletionMarker::new(batch_id.clone(), archive_name(archive))
                .with_rows(rows)
                .with_entries(extraction.entries_extracted);
            match file_checksum(archive) {
                Ok(checksum) => marker = marker.with_checksum(checksum),
                Err(e) => tracing::warn!(batch_id = %batch_id, error = %e, "Archive checksum failed"),
            }
            if let Some(path) = record_file {
                let relative = path
                    .strip_prefix(&resolution.extraction_dir)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .to_string();
                marker = marker.with_record_file(relative);
            }
            if let Err(e) = marker.write(&resolution.extraction_dir, &self.config.state.marker_file_name)
            {
                if e.is_fatal() {
                    return Err(e);
                }
                tracing::warn!(batch_id = %batch_id, error = %e, "Failed to write completion marker");
            }
        }

        Ok(())
    }

    /// Tags and merges whatever extraction left on disk.
    ///
    /// A lost source still gets the partial batch merged before the
    /// connection error is returned, so the session exports it on the way out.
    fn merge_extraction(
        &self,
        batch_id: &BatchId,
        archive: &Path,
        extraction: &ExtractionResult,
        accumulator: &mut Accumulator,
        summary: &mut RunSummary,
    ) -> Result<(Option<PathBuf>, usize)> {
        let lost_connection = match &extraction.failure {
            Some(ExtractionFailure::Connection { message }) => Some(message.clone()),
            Some(failure) => {
                tracing::warn!(
                    batch_id = %batch_id,
                    flagged_file = failure.flagged_file().unwrap_or("-"),
                    error = %failure.message(),
                    "Extraction stopped early, merging what was extracted"
                );
                let mut detail = BatchErrorDetail::new(failure.message())
                    .with_batch_id(batch_id.as_str())
                    .with_archive(archive.display().to_string());
                if let Some(file) = failure.flagged_file() {
                    detail = detail.with_flagged_file(file);
                }
                summary.add_warning(detail);
                None
            }
            None => None,
        };

        if let Some(message) = lost_connection {
            match self.augmenter.augment(&extraction.record_files, batch_id) {
                Ok(augmented) => {
                    let rows = accumulator.merge(augmented.map(|a| a.table));
                    summary.rows_merged += rows;
                    tracing::warn!(batch_id = %batch_id, rows, "Merged partial batch before stopping");
                }
                Err(e) => log_error_with_context!(&e, "Partial batch could not be merged"),
            }
            return Err(BatchMergeError::Connection(format!(
                "Lost access to source while extracting {}: {}",
                archive.display(),
                message
            )));
        }

        let augmented = self.augmenter.augment(&extraction.record_files, batch_id)?;
        let record_file = augmented.as_ref().map(|a| a.path.clone());
        let rows = accumulator.merge(augmented.map(|a| a.table));
        Ok((record_file, rows))
    }

    fn ensure_source_reachable(&self) -> Result<()> {
        let source = &self.config.source.directory;
        match fs::metadata(source) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(BatchMergeError::Connection(format!(
                "Source {} is not a directory",
                source.display()
            ))),
            Err(e) => Err(BatchMergeError::Connection(format!(
                "Source directory {} is unreachable: {}",
                source.display(),
                e
            ))),
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}

fn archive_name(archive: &Path) -> String {
    archive
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| archive.display().to_string())
}
