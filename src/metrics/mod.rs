//! Model evaluation metrics

mod regression;

pub use regression::RegressionMetrics;
