//! End-to-end tests for the batch pipeline
//!
//! Each test builds a source directory of zip archives in a temp dir, runs the
//! coordinator over it and checks the batch directories and master file.

use batchmerge::config::{BatchMergeConfig, GateMode, SourceConfig};
use batchmerge::core::run::RunCoordinator;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn config_for(dir: &Path) -> BatchMergeConfig {
    BatchMergeConfig {
        application: Default::default(),
        source: SourceConfig {
            directory: dir.to_path_buf(),
            ..SourceConfig::default()
        },
        merge: Default::default(),
        state: Default::default(),
        logging: Default::default(),
    }
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn master(dir: &Path) -> String {
    fs::read_to_string(dir.join("master_candidates.csv")).unwrap()
}

#[test]
fn test_single_batch_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("BatchOne.zip"),
        &[
            ("candidates.csv", "candidate_id|name\n20|Bo\n3|Al\n"),
            ("Attachments/cv_3.msg", "mail for 3"),
            ("Attachments/cv_20.msg", "mail for 20"),
        ],
    );

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(summary.archives_found, 1);
    assert_eq!(summary.batches_processed, 1);
    assert_eq!(summary.rows_merged, 2);
    assert!(summary.is_successful());

    let batch_dir = dir.path().join("BatchOne");
    assert_eq!(
        fs::read_to_string(batch_dir.join("candidates.csv")).unwrap(),
        "candidate_id|name|batch_id\n20|Bo|BatchOne\n3|Al|BatchOne\n"
    );
    assert_eq!(
        fs::read_to_string(batch_dir.join("Attachments/cv_3.msg")).unwrap(),
        "mail for 3"
    );
    assert_eq!(
        master(dir.path()),
        "candidate_id|name|batch_id\n3|Al|BatchOne\n20|Bo|BatchOne\n"
    );
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("BatchOne.zip"),
        &[("candidates.csv", "candidate_id|name\n1|Al\n")],
    );
    let coordinator = RunCoordinator::new(config_for(dir.path()));

    coordinator.execute_run().unwrap();
    let first_master = master(dir.path());
    let first_records = fs::read_to_string(dir.path().join("BatchOne/candidates.csv")).unwrap();

    let summary = coordinator.execute_run().unwrap();

    assert_eq!(summary.batches_skipped, 1);
    assert_eq!(summary.rows_seeded, 1);
    assert_eq!(summary.rows_exported, 1);
    assert_eq!(master(dir.path()), first_master);
    assert_eq!(
        fs::read_to_string(dir.path().join("BatchOne/candidates.csv")).unwrap(),
        first_records
    );
}

#[test]
fn test_new_batch_is_added_to_existing_master() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id|name\n5|Ed\n")],
    );
    let coordinator = RunCoordinator::new(config_for(dir.path()));
    coordinator.execute_run().unwrap();

    write_zip(
        &dir.path().join("B.zip"),
        &[("candidates.csv", "candidate_id|name\n1|Al\n5|Ed\n")],
    );
    let summary = coordinator.execute_run().unwrap();

    assert_eq!(summary.batches_processed, 1);
    assert_eq!(summary.batches_skipped, 1);
    assert_eq!(
        master(dir.path()),
        "candidate_id|name|batch_id\n1|Al|B\n5|Ed|A\n5|Ed|B\n"
    );
}

#[test]
fn test_batch_without_record_file() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("MailOnly.zip"),
        &[("Attachments/a.msg", "mail")],
    );

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(summary.batches_processed, 1);
    assert_eq!(summary.rows_merged, 0);
    assert!(dir.path().join("MailOnly/Attachments/a.msg").exists());
    // nothing was ever merged, so there is nothing to write
    assert!(!dir.path().join("master_candidates.csv").exists());
}

#[test]
fn test_header_only_record_file_leaves_master_unchanged() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("master_candidates.csv"),
        "candidate_id|name|batch_id\n1|Al|Old\n",
    )
    .unwrap();
    write_zip(
        &dir.path().join("Empty.zip"),
        &[("candidates.csv", "candidate_id|name\n")],
    );

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(summary.batches_processed, 1);
    assert_eq!(summary.rows_merged, 0);
    assert_eq!(
        master(dir.path()),
        "candidate_id|name|batch_id\n1|Al|Old\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Empty/candidates.csv")).unwrap(),
        "candidate_id|name|batch_id\n"
    );
}

#[test]
fn test_archive_names_colliding_after_normalization() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("RM Export.zip"),
        &[("candidates.csv", "candidate_id\n1\n")],
    );
    write_zip(
        &dir.path().join("RM_Export.zip"),
        &[("candidates.csv", "candidate_id\n2\n")],
    );

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    // the second archive maps to the directory the first one filled
    assert_eq!(summary.batches_processed, 1);
    assert_eq!(summary.batches_skipped, 1);
    assert_eq!(master(dir.path()), "candidate_id|batch_id\n1|RM_Export\n");
}

#[test]
fn test_master_sorted_by_candidate_then_batch() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("C.zip"),
        &[("candidates.csv", "candidate_id\n10\n2\n")],
    );
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id\n10\nx1\n")],
    );
    write_zip(
        &dir.path().join("B.zip"),
        &[("candidates.csv", "candidate_id\n2\n")],
    );

    RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(
        master(dir.path()),
        "candidate_id|batch_id\n2|B\n2|C\n10|A\n10|C\nx1|A\n"
    );
}

#[test]
fn test_columns_are_unioned_across_batches() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id|name\n1|Al\n")],
    );
    write_zip(
        &dir.path().join("B.zip"),
        &[("candidates.csv", "candidate_id|email\n2|bo@example.com\n")],
    );

    RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(
        master(dir.path()),
        "candidate_id|name|batch_id|email\n1|Al|A|\n2||B|bo@example.com\n"
    );
}

#[test]
fn test_record_file_without_candidate_column_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_zip(&dir.path().join("Bad.zip"), &[("candidates.csv", "id\n1\n")]);
    write_zip(
        &dir.path().join("Good.zip"),
        &[("candidates.csv", "candidate_id\n1\n")],
    );

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(summary.batches_failed, 1);
    assert_eq!(summary.batches_processed, 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("Bad/candidates.csv")).unwrap(),
        "id\n1\n"
    );
    assert_eq!(master(dir.path()), "candidate_id|batch_id\n1|Good\n");
}

#[test]
fn test_non_archives_are_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.zip"), "plain text").unwrap();
    fs::write(dir.path().join("readme.txt"), "hello").unwrap();
    write_zip(
        &dir.path().join("Real.zip"),
        &[("candidates.csv", "candidate_id\n1\n")],
    );

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(summary.archives_found, 1);
    assert!(!dir.path().join("notes").exists());
}

#[test]
fn test_marker_gate_reprocesses_directory_without_marker() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id\n1\n")],
    );
    fs::create_dir(dir.path().join("A")).unwrap();
    fs::write(dir.path().join("A/candidates.csv"), "candidate_id\n").unwrap();

    let mut config = config_for(dir.path());
    config.state.gate = GateMode::Marker;
    let coordinator = RunCoordinator::new(config);

    let first = coordinator.execute_run().unwrap();
    assert_eq!(first.batches_processed, 1);
    assert!(dir.path().join("A/.batch_complete.json").exists());

    let second = coordinator.execute_run().unwrap();
    assert_eq!(second.batches_skipped, 1);
    assert_eq!(master(dir.path()), "candidate_id|batch_id\n1|A\n");
}

#[test]
fn test_non_empty_gate_trusts_existing_directory() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id\n1\n")],
    );
    fs::create_dir(dir.path().join("A")).unwrap();
    fs::write(dir.path().join("A/leftover.txt"), "x").unwrap();

    let summary = RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(summary.batches_skipped, 1);
    assert!(!dir.path().join("A/candidates.csv").exists());
}

#[test]
fn test_custom_batch_column() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id\n1\n")],
    );
    let mut config = config_for(dir.path());
    config.merge.batch_column = "folder_name".to_string();

    RunCoordinator::new(config).execute_run().unwrap();

    assert_eq!(master(dir.path()), "candidate_id|folder_name\n1|A\n");
}

#[test]
fn test_missing_source_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = RunCoordinator::new(config_for(&dir.path().join("unmounted")))
        .execute_run()
        .unwrap_err();

    assert!(err.is_fatal());
}

#[test]
fn test_partial_extraction_is_merged_without_marker() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[
            ("candidates.csv", "candidate_id\n1\n"),
            ("Attachments/a.msg", "mail"),
        ],
    );
    // a plain file where the attachments directory should go stops extraction
    fs::create_dir(dir.path().join("A")).unwrap();
    fs::write(dir.path().join("A/Attachments"), "blocker").unwrap();

    let mut config = config_for(dir.path());
    config.state.gate = GateMode::Marker;
    let summary = RunCoordinator::new(config).execute_run().unwrap();

    assert_eq!(summary.batches_processed, 1);
    assert_eq!(summary.rows_merged, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(
        summary.warnings[0].flagged_file.as_deref(),
        Some("Attachments/a.msg")
    );
    assert!(!dir.path().join("A/.batch_complete.json").exists());
    assert_eq!(master(dir.path()), "candidate_id|batch_id\n1|A\n");
}

#[test]
fn test_repeated_column_names_keep_every_cell() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("A.zip"),
        &[("candidates.csv", "candidate_id|phone|phone\n1|111|112\n")],
    );
    write_zip(
        &dir.path().join("B.zip"),
        &[("candidates.csv", "candidate_id|phone|phone\n2|221|222\n")],
    );

    RunCoordinator::new(config_for(dir.path()))
        .execute_run()
        .unwrap();

    assert_eq!(
        master(dir.path()),
        "candidate_id|phone|phone|batch_id\n1|111|112|A\n2|221|222|B\n"
    );
}
