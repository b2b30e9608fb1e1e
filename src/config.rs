//! Pipeline configuration
//!
//! All constants of a training run live here so they can be substituted in tests.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Features used to predict the price, in column order
pub const DEFAULT_FEATURES: [&str; 10] = [
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "waterfront",
    "view",
    "condition",
    "grade",
    "yr_built",
];

/// Configuration of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Reference dataset (CSV)
    pub data_path: PathBuf,
    /// Column used as the row index, never as a feature
    pub index_column: String,
    /// Feature columns, in matrix order
    pub features: Vec<String>,
    /// Target column
    pub target: String,
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the split and the model
    pub seed: u64,
    /// Model training verbosity (0 = silent)
    pub verbose: u8,
    /// Where the trained model is written
    pub model_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("datasets/house_price_random_forest/reference.csv"),
            index_column: "date".to_string(),
            features: DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect(),
            target: "price".to_string(),
            test_size: 0.2,
            seed: 28,
            verbose: 1,
            model_path: PathBuf::from("models/model.pkl"),
        }
    }
}

impl PipelineConfig {
    /// Replace the dataset path
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Replace the model output path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}
