//! Random Forest implementation

use super::decision_tree::{DecisionTree, TreeConfig};
use super::{check_fit_input, check_predict_input, Regressor};
use crate::error::Result;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Random Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (all features if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
    /// Training log verbosity: 0 silent, 1 summary, 2 per tree
    pub verbose: u8,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 0,
            verbose: 0,
        }
    }
}

/// Random Forest regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
    n_features: Option<usize>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
            n_features: None,
        }
    }

    /// Attach column names used for the importance ranking
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }

    /// Predict for a single sample; the caller checks the row width
    pub(crate) fn predict_one(&self, features: ArrayView1<'_, f64>) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        self.trees
            .iter()
            .map(|t| t.predict_one(features))
            .sum::<f64>()
            / self.trees.len() as f64
    }

    /// Get feature importances (normalized to sum to 1)
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Get feature names with importances, sorted by importance.
    ///
    /// Columns without a name are reported as `x<i>`.
    pub fn feature_importance_ranking(&self) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .feature_importances
            .iter()
            .enumerate()
            .map(|(i, &imp)| {
                let name = self
                    .feature_names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("x{}", i));
                (name, imp)
            })
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    /// Train the random forest, building trees in parallel
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        check_fit_input(&x, &y)?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_trees = self.config.n_trees;
        let verbose = self.config.verbose;
        let start = Instant::now();

        if verbose >= 1 {
            info!(
                "Fitting {} trees on {} samples x {} features",
                n_trees, n_samples, n_features
            );
        }

        let config = &self.config;
        let trees: Vec<DecisionTree> = (0..n_trees)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed.wrapping_add(i as u64);
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: config.max_depth,
                    min_samples_split: config.min_samples_split,
                    min_samples_leaf: config.min_samples_leaf,
                    max_features: config.max_features,
                    seed,
                });

                let samples = if config.bootstrap {
                    Self::bootstrap_indices(n_samples, seed)
                } else {
                    (0..n_samples).collect()
                };
                tree.fit_samples(x, y, samples);

                if verbose >= 2 {
                    info!(
                        "Built tree {} of {} (depth {}, {} leaves)",
                        i + 1,
                        n_trees,
                        tree.depth(),
                        tree.n_leaves()
                    );
                }
                tree
            })
            .collect();

        self.trees = trees;
        self.n_features = Some(n_features);

        // Aggregate feature importances
        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }

        // Normalize
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        if verbose >= 1 {
            info!(
                "Fitted {} trees in {:.2}s",
                self.trees.len(),
                start.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }

    /// Predict for multiple samples, averaging over trees
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        check_predict_input(&x, self.n_features)?;
        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| self.predict_one(x.row(i)))
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::metrics::RegressionMetrics;
    use ndarray::Array2;

    fn synthetic(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64 / 20.0
            } else {
                (i as f64 / 10.0).sin()
            }
        });
        let y = Array1::from_shape_fn(n, |i| x[[i, 0]] + x[[i, 1]] * 2.0 + 0.1 * (i % 5) as f64);
        (x, y)
    }

    #[test]
    fn test_random_forest_regression() {
        let (x, y) = synthetic(200);

        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 10,
            max_depth: Some(5),
            seed: 28,
            ..Default::default()
        })
        .with_feature_names(vec!["x1".to_string(), "x2".to_string()]);

        forest.fit(x.view(), y.view()).unwrap();

        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.feature_importances().len(), 2);
        assert_eq!(forest.n_features(), Some(2));

        let preds = forest.predict(x.view()).unwrap();
        let metrics = RegressionMetrics::calculate(y.view(), preds.view()).unwrap();
        assert!(metrics.r2 > 0.9, "r2 = {}", metrics.r2);
    }

    #[test]
    fn test_random_forest_is_deterministic() {
        let (x, y) = synthetic(120);
        let config = ForestConfig {
            n_trees: 8,
            seed: 28,
            ..Default::default()
        };

        let mut a = RandomForest::new(config.clone());
        let mut b = RandomForest::new(config);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn test_random_forest_refit_replaces_state() {
        let (x, y) = synthetic(100);
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 5,
            ..Default::default()
        });
        forest.fit(x.view(), y.view()).unwrap();

        let x1 = x.column(0).to_owned().insert_axis(ndarray::Axis(1));
        forest.fit(x1.view(), y.view()).unwrap();

        assert_eq!(forest.n_trees(), 5);
        assert_eq!(forest.n_features(), Some(1));
        assert!(matches!(
            forest.predict(x.view()),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_feature_importance_ranking() {
        let x = Array2::from_shape_fn((100, 3), |(i, j)| match j {
            0 => ((i * 37) % 100) as f64,
            1 => i as f64,
            _ => 1.0,
        });
        let y = Array1::from_shape_fn(100, |i| 10.0 * i as f64);

        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 10,
            bootstrap: false,
            max_features: Some(3),
            ..Default::default()
        })
        .with_feature_names(vec!["noise".into(), "signal".into(), "constant".into()]);
        forest.fit(x.view(), y.view()).unwrap();

        let ranking = forest.feature_importance_ranking();
        assert_eq!(ranking[0].0, "signal");
        assert_eq!(ranking[2].0, "constant");
        assert_eq!(ranking[2].1, 0.0);
    }

    #[test]
    fn test_unfitted_forest() {
        let forest = RandomForest::new(ForestConfig::default());
        assert!(matches!(
            forest.predict(Array2::zeros((1, 2)).view()),
            Err(Error::NotFitted)
        ));
    }

    #[test]
    fn test_forest_rejects_narrow_rows() {
        let (x, y) = synthetic(50);
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 3,
            ..Default::default()
        });
        forest.fit(x.view(), y.view()).unwrap();

        assert!(matches!(
            forest.predict(Array2::zeros((2, 1)).view()),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_forest_rejects_nan_features() {
        let (mut x, y) = synthetic(30);
        x[[7, 1]] = f64::NAN;
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 3,
            ..Default::default()
        });

        assert!(matches!(
            forest.fit(x.view(), y.view()),
            Err(Error::NonFinite(_))
        ));
        assert_eq!(forest.n_trees(), 0);
    }
}
