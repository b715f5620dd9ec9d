//! Configuration schema types
//!
//! This module defines the configuration structure for batchmerge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Idempotency gate selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// A batch directory that exists and has any content counts as processed
    #[default]
    NonEmptyDir,
    /// A batch directory counts as processed only once its completion marker exists
    Marker,
}

impl fmt::Display for GateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateMode::NonEmptyDir => write!(f, "non_empty_dir"),
            GateMode::Marker => write!(f, "marker"),
        }
    }
}

impl FromStr for GateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "non_empty_dir" => Ok(GateMode::NonEmptyDir),
            "marker" => Ok(GateMode::Marker),
            other => Err(format!(
                "Invalid gate mode '{other}'. Must be one of: non_empty_dir, marker"
            )),
        }
    }
}

/// Main batchmerge configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMergeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source directory and archive layout
    pub source: SourceConfig,

    /// Merge and master file settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Batch state settings
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BatchMergeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.merge.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Absolute path of the master file
    pub fn master_path(&self) -> PathBuf {
        self.source.directory.join(&self.merge.master_file_name)
    }

    /// Logging configuration with the log directory resolved against the
    /// source directory when not set explicitly
    pub fn resolved_logging(&self) -> LoggingConfig {
        let mut logging = self.logging.clone();
        if logging.local_path.trim().is_empty() {
            logging.local_path = self.source.directory.to_string_lossy().to_string();
        }
        logging
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (scan and report without touching the source directory)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Source directory and archive layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the export archives and the produced batch directories
    pub directory: PathBuf,

    /// File name suffix an archive must carry
    #[serde(default = "default_archive_suffix")]
    pub archive_suffix: String,

    /// Canonical record file name inside an archive
    #[serde(default = "default_record_file_name")]
    pub record_file_name: String,

    /// Path segment under which attachments live
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,

    /// Extension of attachment (message) files
    #[serde(default = "default_attachment_extension")]
    pub attachment_extension: String,

    /// Column delimiter of record files and the master file
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("source.directory cannot be empty".to_string());
        }

        if self.archive_suffix.is_empty() {
            return Err("source.archive_suffix cannot be empty".to_string());
        }

        if self.record_file_name.is_empty() {
            return Err("source.record_file_name cannot be empty".to_string());
        }

        if self.delimiter.len() != 1 || !self.delimiter.is_ascii() {
            return Err(format!(
                "source.delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ));
        }

        Ok(())
    }

    /// Delimiter as the byte the csv codec expects
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b'|')
    }

    /// Archive layout rules derived from this section
    pub fn layout(&self) -> ArchiveLayout {
        ArchiveLayout {
            record_extension: Path::new(&self.record_file_name)
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| ".csv".to_string()),
            attachments_dir: self.attachments_dir.clone(),
            attachment_extension: self.attachment_extension.clone(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            archive_suffix: default_archive_suffix(),
            record_file_name: default_record_file_name(),
            attachments_dir: default_attachments_dir(),
            attachment_extension: default_attachment_extension(),
            delimiter: default_delimiter(),
        }
    }
}

/// Entry classification rules for the archive extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Suffix of record-file candidates (e.g. `.csv`)
    pub record_extension: String,
    /// Path segment under which attachments live
    pub attachments_dir: String,
    /// Suffix of attachment files
    pub attachment_extension: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        SourceConfig::default().layout()
    }
}

/// Merge and master file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Column identifying a candidate; every record file must carry it
    #[serde(default = "default_candidate_column")]
    pub candidate_column: String,

    /// Synthetic column written with the batch identifier
    #[serde(default = "default_batch_column")]
    pub batch_column: String,

    /// Master file name inside the source directory
    #[serde(default = "default_master_file_name")]
    pub master_file_name: String,

    /// Rows written between flushes of the master file
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl MergeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.candidate_column.is_empty() {
            return Err("merge.candidate_column cannot be empty".to_string());
        }

        if self.batch_column.is_empty() {
            return Err("merge.batch_column cannot be empty".to_string());
        }

        if self.candidate_column == self.batch_column {
            return Err(format!(
                "merge.candidate_column and merge.batch_column must differ, both are '{}'",
                self.batch_column
            ));
        }

        if self.master_file_name.is_empty() {
            return Err("merge.master_file_name cannot be empty".to_string());
        }

        if !(1..=1_000_000).contains(&self.chunk_size) {
            return Err(format!(
                "merge.chunk_size must be between 1 and 1000000, got {}",
                self.chunk_size
            ));
        }

        Ok(())
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            candidate_column: default_candidate_column(),
            batch_column: default_batch_column(),
            master_file_name: default_master_file_name(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Batch state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Idempotency gate
    #[serde(default)]
    pub gate: GateMode,

    /// Write a completion marker into each processed batch directory
    #[serde(default = "default_true")]
    pub write_marker: bool,

    /// Completion marker file name
    #[serde(default = "default_marker_file_name")]
    pub marker_file_name: String,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.marker_file_name.is_empty() {
            return Err("state.marker_file_name cannot be empty".to_string());
        }

        if self.gate == GateMode::Marker && !self.write_marker {
            return Err(
                "state.write_marker must be true when state.gate = 'marker', \
                otherwise every batch is re-extracted on each run"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            gate: GateMode::default(),
            write_marker: true,
            marker_file_name: default_marker_file_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory (empty = source directory)
    #[serde(default)]
    pub local_path: String,

    /// Log file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Log line format (text or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }

        if self.local_enabled && self.file_prefix.is_empty() {
            return Err("logging.file_prefix cannot be empty".to_string());
        }

        Ok(())
    }

    /// Console-only logging
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: String::new(),
            file_prefix: default_file_prefix(),
            local_rotation: default_local_rotation(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_archive_suffix() -> String {
    ".zip".to_string()
}

fn default_record_file_name() -> String {
    "candidates.csv".to_string()
}

fn default_attachments_dir() -> String {
    "Attachments".to_string()
}

fn default_attachment_extension() -> String {
    ".msg".to_string()
}

fn default_delimiter() -> String {
    "|".to_string()
}

fn default_candidate_column() -> String {
    "candidate_id".to_string()
}

fn default_batch_column() -> String {
    "batch_id".to_string()
}

fn default_master_file_name() -> String {
    "master_candidates.csv".to_string()
}

fn default_chunk_size() -> usize {
    10_000
}

fn default_marker_file_name() -> String {
    ".batch_complete.json".to_string()
}

fn default_file_prefix() -> String {
    "app_log".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
