//! Batch state management
//!
//! - [`tracker`] - Idempotency gate over batch directories
//! - [`marker`] - Completion markers written into processed batches

pub mod marker;
pub mod tracker;

pub use marker::{file_checksum, CompletionMarker};
pub use tracker::{BatchResolution, BatchState, BatchStateTracker};
