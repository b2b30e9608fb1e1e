//! Machine learning models module
//!
//! Provides Decision Tree and Random Forest regressors behind a common
//! [`Regressor`] trait so the pipeline does not depend on a specific algorithm.

mod decision_tree;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use random_forest::{ForestConfig, RandomForest};

use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// A trainable regression model
pub trait Regressor {
    /// Fit on a feature matrix and aligned targets, replacing any previous state
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()>;

    /// Predict one value per row of `x`
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>>;

    /// Number of input columns seen during fit, `None` before fitting
    fn n_features(&self) -> Option<usize>;
}

/// Validate training inputs shared by all regressors
pub(crate) fn check_fit_input(x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} feature rows but {} targets",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 {
        return Err(Error::EmptyInput("no training samples"));
    }
    if x.ncols() == 0 {
        return Err(Error::EmptyInput("no features"));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("training input contains NaN or infinite values"));
    }
    Ok(())
}

/// Validate prediction input against the fitted width
pub(crate) fn check_predict_input(x: &ArrayView2<'_, f64>, n_features: Option<usize>) -> Result<()> {
    match n_features {
        None => Err(Error::NotFitted),
        Some(n) if n != x.ncols() => Err(Error::ShapeMismatch(format!(
            "model expects {} features, got {}",
            n,
            x.ncols()
        ))),
        Some(_) => Ok(()),
    }
}
