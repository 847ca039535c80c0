//! Corpus scanning and dataset building for sonoclass.
//!
//! Walks the fold directories, reads labels from file names, and drives
//! decoding and feature extraction file by file into a `Dataset`.

pub mod label;
pub mod pipeline;
pub mod scanner;

pub use label::LabelContract;
pub use pipeline::{ScanReport, build_dataset};
pub use scanner::{CorpusFile, scan_corpus};
