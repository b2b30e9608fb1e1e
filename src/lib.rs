//! # House Price Forest - Random Forest Regression Pipeline
//!
//! This library loads a tabular house price dataset, trains a Random Forest
//! regressor on a fixed set of features, evaluates it on a held-out split and
//! persists the trained model.
//!
//! ## Modules
//!
//! - `config` - Fixed pipeline configuration
//! - `data` - Dataset loading and train/test splitting
//! - `models` - Decision Tree and Random Forest regressors
//! - `metrics` - Regression evaluation metrics
//! - `pipeline` - The training stages wired together
//! - `persist` - Model serialization

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod persist;
pub mod pipeline;

pub use config::PipelineConfig;
pub use data::{Dataset, Split};
pub use error::{Error, Result};
pub use metrics::RegressionMetrics;
pub use models::{DecisionTree, ForestConfig, RandomForest, Regressor, TreeConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::data::{Dataset, Split};
    pub use crate::error::{Error, Result};
    pub use crate::metrics::RegressionMetrics;
    pub use crate::models::{DecisionTree, ForestConfig, RandomForest, Regressor, TreeConfig};
    pub use crate::persist::{load_model, save_model};
    pub use crate::pipeline::{evaluate, model_setup, prepare_data, run, train};
}
