//! Data structures and preprocessing module
//!
//! Provides the tabular dataset type, CSV loading and train/test splitting.

mod dataset;

pub use dataset::{Dataset, Split};
