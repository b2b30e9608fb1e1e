//! Regression metrics for evaluating model performance

use crate::error::{Error, Result};
use ndarray::ArrayView1;

/// Collection of regression metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// R-squared (coefficient of determination)
    pub r2: f64,
    /// Number of samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Calculate all regression metrics.
    ///
    /// Each metric is computed from the raw residuals on its own.
    pub fn calculate(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} targets but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(Error::EmptyInput("no samples to evaluate"));
        }

        Ok(Self {
            mse: Self::mean_squared_error(y_true, y_pred),
            mae: Self::mean_absolute_error(y_true, y_pred),
            rmse: Self::root_mean_squared_error(y_true, y_pred),
            r2: Self::r_squared(y_true, y_pred),
            n_samples: y_true.len(),
        })
    }

    /// Mean Squared Error: (1/n) * Σ(y_true - y_pred)²
    pub fn mean_squared_error(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
        let n = y_true.len() as f64;
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum::<f64>()
            / n
    }

    /// Root Mean Squared Error
    pub fn root_mean_squared_error(
        y_true: ArrayView1<'_, f64>,
        y_pred: ArrayView1<'_, f64>,
    ) -> f64 {
        Self::mean_squared_error(y_true, y_pred).sqrt()
    }

    /// Mean Absolute Error: (1/n) * Σ|y_true - y_pred|
    pub fn mean_absolute_error(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
        let n = y_true.len() as f64;
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).abs())
            .sum::<f64>()
            / n
    }

    /// R-squared (coefficient of determination)
    /// R² = 1 - SS_res / SS_tot
    ///
    /// A constant target gives 1.0 for a perfect fit and 0.0 otherwise.
    pub fn r_squared(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
        let y_mean = y_true.mean().unwrap_or(0.0);

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - y_mean).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = array![221900.0, 538000.0, 180000.0, 604000.0];
        let m = RegressionMetrics::calculate(y.view(), y.view()).unwrap();

        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.n_samples, 4);
    }

    #[test]
    fn test_known_values() {
        let y_true = array![3.0, -0.5, 2.0, 7.0];
        let y_pred = array![2.5, 0.0, 2.0, 8.0];
        let m = RegressionMetrics::calculate(y_true.view(), y_pred.view()).unwrap();

        assert_relative_eq!(m.mse, 0.375, epsilon = 1e-12);
        assert_relative_eq!(m.mae, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.r2, 0.948_608_137_044_967_9, epsilon = 1e-12);
    }

    #[test]
    fn test_rmse_is_sqrt_mse() {
        let y_true = array![100.0, 250.0, 80.5, 12.0, 999.0];
        let y_pred = array![110.0, 240.0, 70.0, 30.0, 900.0];
        let m = RegressionMetrics::calculate(y_true.view(), y_pred.view()).unwrap();

        assert_relative_eq!(m.rmse, m.mse.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let y_true = array![5.0, 5.0, 5.0];
        let y_pred = array![4.0, 5.0, 6.0];
        assert_eq!(RegressionMetrics::r_squared(y_true.view(), y_pred.view()), 0.0);
        assert_eq!(RegressionMetrics::r_squared(y_true.view(), y_true.view()), 1.0);
    }

    #[test]
    fn test_invalid_input() {
        let a = array![1.0, 2.0];
        let b = array![1.0];
        assert!(matches!(
            RegressionMetrics::calculate(a.view(), b.view()),
            Err(Error::ShapeMismatch(_))
        ));

        let empty = ndarray::Array1::<f64>::zeros(0);
        assert!(matches!(
            RegressionMetrics::calculate(empty.view(), empty.view()),
            Err(Error::EmptyInput(_))
        ));
    }
}
