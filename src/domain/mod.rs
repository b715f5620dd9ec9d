//! Domain models and types for batchmerge.
//!
//! This module contains the core domain models, types, and error hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`BatchId`])
//! - **Tabular records** ([`RecordTable`])
//! - **Error types** ([`BatchMergeError`], [`ArchiveError`], [`RecordError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BatchMergeError>`]:
//!
//! ```rust
//! use batchmerge::domain::{BatchMergeError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = batchmerge::config::load_config("batchmerge.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ArchiveError, BatchErrorDetail, BatchMergeError, RecordError};
pub use ids::BatchId;
pub use record::RecordTable;
pub use result::Result;
