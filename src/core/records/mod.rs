//! Record files and the merged dataset
//!
//! - [`codec`] - Delimited file read/write
//! - [`augment`] - Adds the batch column to a batch's record file
//! - [`accumulator`] - In-memory union of merged batches
//! - [`master`] - Master file load, sort and export

pub mod accumulator;
pub mod augment;
pub mod codec;
pub mod master;

pub use accumulator::Accumulator;
pub use augment::{AugmentedRecords, RecordAugmenter};
pub use master::{compare_cells, MasterFile};
