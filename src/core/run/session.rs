//! Run session
//!
//! Owns the accumulated dataset for the lifetime of a run and guarantees a
//! single export attempt: either explicitly through [`RunSession::finish`],
//! or best-effort when the session is dropped on an error or panic path.

use crate::core::records::{Accumulator, MasterFile};
use crate::domain::Result;

/// Accumulated dataset plus its pending export
#[derive(Debug)]
pub struct RunSession {
    accumulator: Accumulator,
    master: MasterFile,
    persist: bool,
    exported: bool,
}

impl RunSession {
    /// Open a session seeded from the master file.
    ///
    /// With `persist` false (dry runs) nothing is ever written.
    ///
    /// # Errors
    ///
    /// Fails when an existing master file cannot be read.
    pub fn open(master: MasterFile, persist: bool) -> Result<Self> {
        let seed = master.load()?;
        Ok(Self {
            accumulator: Accumulator::new(seed),
            master,
            persist,
            exported: false,
        })
    }

    /// Accumulated dataset
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Accumulated dataset, for merging
    pub fn accumulator_mut(&mut self) -> &mut Accumulator {
        &mut self.accumulator
    }

    /// Export the accumulated dataset and close the session.
    ///
    /// Returns the rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.exported = true;
        if !self.persist {
            tracing::info!(
                rows = self.accumulator.len(),
                "Dry run, master file not written"
            );
            return Ok(0);
        }
        self.master.export(self.accumulator.dataset_mut())
    }
}

impl Drop for RunSession {
    fn drop(&mut self) {
        if self.exported || !self.persist {
            return;
        }
        self.exported = true;

        tracing::warn!(
            rows = self.accumulator.len(),
            "Run ended abnormally, exporting accumulated dataset"
        );
        match self.master.export(self.accumulator.dataset_mut()) {
            Ok(rows) => tracing::info!(rows, "Exit-time export completed"),
            Err(e) => tracing::error!(error = %e, "Exit-time export failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchMergeConfig, SourceConfig};
    use crate::domain::RecordTable;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn master_in(dir: &Path) -> MasterFile {
        let config = BatchMergeConfig {
            application: Default::default(),
            source: SourceConfig {
                directory: dir.to_path_buf(),
                ..SourceConfig::default()
            },
            merge: Default::default(),
            state: Default::default(),
            logging: Default::default(),
        };
        MasterFile::from_config(&config)
    }

    fn batch_rows(id: &str, batch: &str) -> RecordTable {
        RecordTable::new(
            vec!["candidate_id".to_string(), "batch_id".to_string()],
            vec![vec![id.to_string(), batch.to_string()]],
        )
    }

    #[test]
    fn test_finish_exports_once() {
        let dir = TempDir::new().unwrap();
        let master = master_in(dir.path());
        let path = master.path().to_path_buf();

        let mut session = RunSession::open(master, true).unwrap();
        session.accumulator_mut().merge(Some(batch_rows("1", "A")));
        assert_eq!(session.finish().unwrap(), 1);

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "candidate_id|batch_id\n1|A\n"
        );
    }

    #[test]
    fn test_drop_exports_accumulated_rows() {
        let dir = TempDir::new().unwrap();
        let master = master_in(dir.path());
        let path = master.path().to_path_buf();

        {
            let mut session = RunSession::open(master, true).unwrap();
            session.accumulator_mut().merge(Some(batch_rows("2", "B")));
        }

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "candidate_id|batch_id\n2|B\n"
        );
    }

    #[test]
    fn test_drop_during_panic_exports() {
        let dir = TempDir::new().unwrap();
        let master = master_in(dir.path());
        let path = master.path().to_path_buf();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut session = RunSession::open(master, true).unwrap();
            session.accumulator_mut().merge(Some(batch_rows("3", "C")));
            panic!("unexpected failure mid-run");
        }));

        assert!(result.is_err());
        assert!(fs::read_to_string(path).unwrap().contains("3|C"));
    }

    #[test]
    fn test_dry_run_session_never_writes() {
        let dir = TempDir::new().unwrap();
        let master = master_in(dir.path());
        let path = master.path().to_path_buf();

        let mut session = RunSession::open(master.clone(), false).unwrap();
        session.accumulator_mut().merge(Some(batch_rows("1", "A")));
        assert_eq!(session.finish().unwrap(), 0);

        {
            let mut session = RunSession::open(master, false).unwrap();
            session.accumulator_mut().merge(Some(batch_rows("1", "A")));
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_session_seeds_from_master() {
        let dir = TempDir::new().unwrap();
        let master = master_in(dir.path());
        fs::write(master.path(), "candidate_id|batch_id\n1|A\n").unwrap();

        let session = RunSession::open(master, true).unwrap();
        assert_eq!(session.accumulator().len(), 1);
    }
}
