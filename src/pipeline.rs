//! Training pipeline
//!
//! The stages of a run, in order: [`prepare_data`], [`model_setup`], [`train`],
//! [`evaluate`] and [`save_model`](crate::persist::save_model). [`run`] wires
//! them together; any stage error aborts the rest.

use crate::config::PipelineConfig;
use crate::data::{Dataset, Split};
use crate::error::Result;
use crate::metrics::RegressionMetrics;
use crate::models::{ForestConfig, RandomForest, Regressor};
use crate::persist::save_model;
use ndarray::{ArrayView1, ArrayView2};
use tracing::info;

/// Load the reference dataset, select features and split it into train and test.
///
/// Returns [`Error::DataNotFound`](crate::Error::DataNotFound) if the file is missing.
pub fn prepare_data(config: &PipelineConfig) -> Result<Split> {
    let dataset = Dataset::from_csv(
        &config.data_path,
        &config.index_column,
        &config.features,
        &config.target,
    )?;

    info!("Preparing data for train and test");
    let split = dataset.random_split(config.test_size, config.seed)?;
    info!(
        "Train set: {} samples, test set: {} samples",
        split.train.n_samples(),
        split.test.n_samples()
    );
    Ok(split)
}

/// Initialise the untrained regression model
pub fn model_setup(config: &PipelineConfig) -> RandomForest {
    info!("Creating Random Forest Regressor model");
    RandomForest::new(ForestConfig {
        seed: config.seed,
        verbose: config.verbose,
        ..Default::default()
    })
    .with_feature_names(config.features.clone())
}

/// Fit the model on the training set
pub fn train<R: Regressor>(
    model: &mut R,
    x_train: ArrayView2<'_, f64>,
    y_train: ArrayView1<'_, f64>,
) -> Result<()> {
    info!("Training model");
    model.fit(x_train, y_train)?;
    info!("Training Completed");
    Ok(())
}

/// Evaluate the model on the test set and log the metrics
pub fn evaluate<R: Regressor>(
    model: &R,
    x_test: ArrayView2<'_, f64>,
    y_test: ArrayView1<'_, f64>,
) -> Result<RegressionMetrics> {
    info!("Evaluating model on test set");
    let predictions = model.predict(x_test)?;
    let metrics = RegressionMetrics::calculate(y_test, predictions.view())?;

    info!("Mean Squared Error: {}", metrics.mse);
    info!("Mean Absolute Error: {}", metrics.mae);
    info!("Root Mean Squared Error: {}", metrics.rmse);
    info!("R-Squared: {}", metrics.r2);
    Ok(metrics)
}

/// Log the most important features of a fitted forest
fn log_feature_importances(model: &RandomForest) {
    for (rank, (name, importance)) in model
        .feature_importance_ranking()
        .iter()
        .take(5)
        .enumerate()
    {
        info!("Feature importance #{}: {} = {:.4}", rank + 1, name, importance);
    }
}

/// Run the full training sequence and return the test metrics.
///
/// The model is saved regardless of its scores.
pub fn run(config: &PipelineConfig) -> Result<RegressionMetrics> {
    info!("Pipeline configuration: {}", serde_json::to_string(config)?);

    let split = prepare_data(config)?;

    let mut model = model_setup(config);
    train(
        &mut model,
        split.train.features.view(),
        split.train.targets.view(),
    )?;
    log_feature_importances(&model);

    let metrics = evaluate(&model, split.test.features.view(), split.test.targets.view())?;
    save_model(&model, &config.model_path)?;

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionTree, TreeConfig};
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array2};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::FmtSubscriber;

    /// In-memory log sink
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_missing_data_logs_error_only() {
        let logs = LogBuffer::default();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();

        let config = PipelineConfig::default().with_data_path("/nonexistent/reference.csv");
        let result = tracing::subscriber::with_default(subscriber, || prepare_data(&config));

        assert!(matches!(result, Err(crate::Error::DataNotFound { .. })));
        let output = logs.contents();
        assert!(output.contains("Reference data does not exist in path"));
        assert!(!output.contains("Preparing data"));
    }

    #[test]
    fn test_model_setup_uses_config() {
        let config = PipelineConfig::default();
        let model = model_setup(&config);

        assert_eq!(model.config().seed, 28);
        assert_eq!(model.config().verbose, 1);
        assert_eq!(model.config().n_trees, 100);
        assert_eq!(model.feature_names().len(), 10);
        assert_eq!(model.n_features(), None);
    }

    #[test]
    fn test_evaluate_perfect_model() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(30, |i| (i * i) as f64);

        let mut tree = DecisionTree::new(TreeConfig::default());
        train(&mut tree, x.view(), y.view()).unwrap();
        let metrics = evaluate(&tree, x.view(), y.view()).unwrap();

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_evaluate_rmse_matches_mse() {
        let x_train = array![[0.0], [1.0], [2.0], [3.0]];
        let y_train = array![0.0, 0.0, 10.0, 10.0];
        let mut tree = DecisionTree::new(TreeConfig::default());
        train(&mut tree, x_train.view(), y_train.view()).unwrap();

        let x_test = array![[0.5], [2.5], [1.2]];
        let y_test = array![1.0, 7.0, 4.0];
        let metrics = evaluate(&tree, x_test.view(), y_test.view()).unwrap();

        assert_relative_eq!(metrics.mse, (1.0 + 9.0 + 16.0) / 3.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.rmse, metrics.mse.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(metrics.mae, (1.0 + 3.0 + 4.0) / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_unfitted_model_fails() {
        let model = model_setup(&PipelineConfig::default());
        let x = Array2::zeros((2, 10));
        let y = Array1::zeros(2);
        assert!(evaluate(&model, x.view(), y.view()).is_err());
    }
}
