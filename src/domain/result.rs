//! Result type alias for batchmerge
//!
//! This module provides a convenient Result type alias that uses BatchMergeError
//! as the error type.

use super::errors::BatchMergeError;

/// Result type alias for batchmerge operations
///
/// # Examples
///
/// ```
/// use batchmerge::domain::result::Result;
/// use batchmerge::domain::errors::BatchMergeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BatchMergeError::Export("master not writable".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BatchMergeError>;
