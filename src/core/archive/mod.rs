//! Archive discovery and extraction
//!
//! - [`scanner`] - Finds batch archives in the source directory
//! - [`extractor`] - Extracts an archive and classifies its entries

pub mod extractor;
pub mod scanner;

pub use extractor::{ArchiveExtractor, ExtractionFailure, ExtractionResult};
pub use scanner::{has_zip_signature, ArchiveIter, BatchScanner};
