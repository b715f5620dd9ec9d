//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BatchMergeConfig, GateMode};
use crate::domain::errors::BatchMergeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BatchMergeConfig
/// 4. Applies environment variable overrides (BATCHMERGE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use batchmerge::config::loader::load_config;
///
/// let config = load_config("batchmerge.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BatchMergeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BatchMergeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BatchMergeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BatchMergeConfig = toml::from_str(&contents)
        .map_err(|e| BatchMergeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BatchMergeError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BatchMergeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Comments are copied verbatim
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BatchMergeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using BATCHMERGE_* prefix
///
/// Environment variables follow the pattern: BATCHMERGE_<SECTION>_<KEY>
/// For example: BATCHMERGE_SOURCE_DIRECTORY, BATCHMERGE_STATE_GATE
fn apply_env_overrides(config: &mut BatchMergeConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("BATCHMERGE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("BATCHMERGE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Source overrides
    if let Ok(val) = std::env::var("BATCHMERGE_SOURCE_DIRECTORY") {
        config.source.directory = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("BATCHMERGE_SOURCE_DELIMITER") {
        config.source.delimiter = val;
    }

    // Merge overrides
    if let Ok(val) = std::env::var("BATCHMERGE_MERGE_BATCH_COLUMN") {
        config.merge.batch_column = val;
    }
    if let Ok(val) = std::env::var("BATCHMERGE_MERGE_CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.merge.chunk_size = size;
        }
    }

    // State overrides
    if let Ok(val) = std::env::var("BATCHMERGE_STATE_GATE") {
        config.state.gate = GateMode::from_str(&val).map_err(BatchMergeError::Configuration)?;
    }
    if let Ok(val) = std::env::var("BATCHMERGE_STATE_WRITE_MARKER") {
        config.state.write_marker = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BATCHMERGE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("BATCHMERGE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("BATCHMERGE_LOGGING_FORMAT") {
        config.logging.format = val;
    }

    Ok(())
}
