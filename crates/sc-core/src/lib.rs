//! Configuration, data model, and shared traits for sonoclass.
//!
//! This crate contains the types every stage of the pipeline agrees on:
//! feature frames, labels, the assembled dataset and its split, the run
//! configuration, and the error taxonomy.

pub mod config;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod traits;

pub use config::Config;
pub use dataset::{Dataset, LabelIndex, Split, Subset};
pub use error::CoreError;
pub use frame::{FeatureFrame, FrameShape, LabelId};
pub use traits::{FeatureExtractor, Metrics, Trainer};
