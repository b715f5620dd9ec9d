//! Run orchestration
//!
//! - [`coordinator`] - Drives one pass over the source directory
//! - [`session`] - Owns the accumulated dataset and its single export
//! - [`summary`] - Run results and reporting

pub mod coordinator;
pub mod session;
pub mod summary;

pub use coordinator::RunCoordinator;
pub use session::RunSession;
pub use summary::RunSummary;
