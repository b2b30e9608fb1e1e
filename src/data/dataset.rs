//! Dataset structure for machine learning

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::{debug, error};

/// Tabular dataset with a feature matrix and an aligned target vector
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Array2<f64>,
    /// Target values, one per row of `features`
    pub targets: Array1<f64>,
    /// Feature names, in column order
    pub feature_names: Vec<String>,
    /// Row keys taken from the index column
    pub index: Vec<String>,
}

/// Train/test split result
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    /// Create a dataset from aligned arrays
    pub fn new(
        features: Array2<f64>,
        targets: Array1<f64>,
        feature_names: Vec<String>,
        index: Vec<String>,
    ) -> Result<Self> {
        let n = features.nrows();
        if targets.len() != n || index.len() != n {
            return Err(Error::ShapeMismatch(format!(
                "{} feature rows, {} targets, {} index keys",
                n,
                targets.len(),
                index.len()
            )));
        }
        if feature_names.len() != features.ncols() {
            return Err(Error::ShapeMismatch(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                features.ncols()
            )));
        }

        Ok(Self {
            features,
            targets,
            feature_names,
            index,
        })
    }

    /// Load selected columns from a CSV file with a header row.
    ///
    /// The index column is kept as row keys; every feature and the target
    /// must parse as a finite `f64`.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        index_column: &str,
        features: &[String],
        target: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            error!("Reference data does not exist in path: {}", path.display());
            return Err(Error::DataNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };

        let index_idx = column(index_column)?;
        let feature_idx = features
            .iter()
            .map(|name| column(name.as_str()))
            .collect::<Result<Vec<_>>>()?;
        let target_idx = column(target)?;

        let mut values = Vec::new();
        let mut targets = Vec::new();
        let mut index = Vec::new();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let parse = |col: usize, name: &str| -> Result<f64> {
                let raw = record.get(col).unwrap_or("").trim();
                match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(Error::Parse {
                        line,
                        column: name.to_string(),
                        value: raw.to_string(),
                    }),
                }
            };

            for (&col, name) in feature_idx.iter().zip(features) {
                values.push(parse(col, name.as_str())?);
            }
            targets.push(parse(target_idx, target)?);
            index.push(record.get(index_idx).unwrap_or("").to_string());
        }

        let n_samples = targets.len();
        debug!(
            "Read {} rows x {} features from {}",
            n_samples,
            features.len(),
            path.display()
        );

        let features_array = Array2::from_shape_vec((n_samples, features.len()), values)?;
        Self::new(
            features_array,
            Array1::from_vec(targets),
            features.to_vec(),
            index,
        )
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Create a subset of the dataset by row indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
            index: indices.iter().map(|&i| self.index[i].clone()).collect(),
        }
    }

    /// Random shuffle split, reproducible for a given seed.
    ///
    /// The test partition gets `ceil(test_size * n)` rows; ordering of the
    /// index is ignored.
    pub fn random_split(&self, test_size: f64, seed: u64) -> Result<Split> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(Error::InvalidTestSize(test_size));
        }

        let n = self.n_samples();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(Error::InvalidSplit {
                n_samples: n,
                test_size,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let (test_indices, train_indices) = indices.split_at(n_test);

        Ok(Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        })
    }
}
