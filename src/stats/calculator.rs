//! Error Calculator Module
//! Handles error-norm computations over solution tables.

use ndarray::{Array2, Axis};
use rayon::prelude::*;
use statrs::statistics::{Data, Max, OrderStatistics, Statistics};
use thiserror::Error;

/// f32 unit roundoff, the error floor a mixed-precision run can reach.
pub const UNIT_ROUNDOFF_F32: f64 = f32::EPSILON as f64;

/// f64 unit roundoff, the error floor a full-precision run can reach.
pub const UNIT_ROUNDOFF_F64: f64 = f64::EPSILON;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("shape mismatch: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// Descriptive summary of a per-row error distribution.
#[derive(Debug, Clone)]
pub struct ErrorSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p95: f64,
    pub max: f64,
}

impl Default for ErrorSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p95: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles numerical-error calculations with multi-threading support.
pub struct ErrorCalculator;

impl ErrorCalculator {
    /// Element-wise difference of two equally shaped solution tables.
    pub fn elementwise_diff(
        a: &Array2<f64>,
        b: &Array2<f64>,
    ) -> Result<Array2<f64>, StatsError> {
        if a.dim() != b.dim() {
            return Err(StatsError::DimensionMismatch {
                left: a.dim(),
                right: b.dim(),
            });
        }
        Ok(a - b)
    }

    /// Euclidean norm of each row of a difference table.
    pub fn row_l2_norms(diff: &Array2<f64>) -> Vec<f64> {
        diff.axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| row.dot(&row).sqrt())
            .collect()
    }

    /// Largest absolute component of each row of a difference table.
    pub fn row_max_norms(diff: &Array2<f64>) -> Vec<f64> {
        diff.axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| row.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())))
            .collect()
    }

    /// Largest absolute value in a series.
    pub fn max_abs(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Compute descriptive statistics for an array of error values.
    pub fn summarize(values: &[f64]) -> ErrorSummary {
        let n = values.len();
        if n == 0 {
            return ErrorSummary::default();
        }

        let mean = values.iter().mean();
        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        let mut data = Data::new(values.to_vec());
        ErrorSummary {
            count: n,
            mean,
            median: data.percentile(50),
            std,
            p95: data.percentile(95),
            max: data.max(),
        }
    }

    /// Observed order of accuracy: least-squares slope of log(error)
    /// against log(dt). Nonpositive or non-finite points cannot be
    /// placed on log axes and are skipped; fewer than two usable points
    /// leave the order undefined.
    pub fn convergence_order(dt: &[f64], errors: &[f64]) -> Option<f64> {
        let points: Vec<(f64, f64)> = dt
            .iter()
            .zip(errors.iter())
            .filter(|(d, e)| **d > 0.0 && **e > 0.0 && d.is_finite() && e.is_finite())
            .map(|(d, e)| (d.ln(), e.ln()))
            .collect();

        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();

        Some(sxy / sxx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn diff_and_row_norms_match_hand_computation() {
        let baseline = array![[1.0, 2.0], [0.5, -0.5]];
        let candidate = array![[-2.0, -2.0], [0.5, -0.5]];

        let diff = ErrorCalculator::elementwise_diff(&baseline, &candidate).expect("diff");
        assert_eq!(diff, array![[3.0, 4.0], [0.0, 0.0]]);

        let l2 = ErrorCalculator::row_l2_norms(&diff);
        let linf = ErrorCalculator::row_max_norms(&diff);
        assert_eq!(l2, vec![5.0, 0.0]);
        assert_eq!(linf, vec![4.0, 0.0]);
    }

    #[test]
    fn euclidean_norm_of_fixed_literal_pair() {
        // sqrt((-0.5)^2 + 2.0^2) = sqrt(4.25)
        let a = array![[1.0, 2.0]];
        let b = array![[1.5, 0.0]];
        let diff = ErrorCalculator::elementwise_diff(&a, &b).expect("diff");
        let l2 = ErrorCalculator::row_l2_norms(&diff);
        assert!((l2[0] - 4.25_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let a = Array2::<f64>::zeros((3, 2));
        let b = Array2::<f64>::zeros((2, 2));
        assert!(matches!(
            ErrorCalculator::elementwise_diff(&a, &b),
            Err(StatsError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn max_abs_ignores_sign() {
        assert_eq!(ErrorCalculator::max_abs(&[-3.0, 2.0, 1.0]), 3.0);
        assert!(ErrorCalculator::max_abs(&[]).is_nan());
    }

    #[test]
    fn summary_of_known_sample() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let summary = ErrorCalculator::summarize(&values);

        assert_eq!(summary.count, 101);
        assert!((summary.mean - 50.0).abs() < 1e-12);
        assert!((summary.median - 50.0).abs() < 1e-12);
        assert_eq!(summary.max, 100.0);
        // sample std of 0..=100 is sqrt(85850 / 100)
        assert!((summary.std - 858.5_f64.sqrt()).abs() < 1e-9);
        // quantile estimators differ slightly; p95 must land near 95
        assert!((summary.p95 - 95.0).abs() <= 1.0);
    }

    #[test]
    fn summary_of_empty_sample_is_nan() {
        let summary = ErrorCalculator::summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
        assert!(summary.max.is_nan());
    }

    #[test]
    fn observed_order_recovers_power_law() {
        let dt: [f64; 4] = [1e-1, 1e-2, 1e-3, 1e-4];
        let errors: Vec<f64> = dt.iter().map(|d| 3.0 * d.powi(2)).collect();
        let order = ErrorCalculator::convergence_order(&dt, &errors).expect("order");
        assert!((order - 2.0).abs() < 1e-9);
    }

    #[test]
    fn observed_order_undefined_for_degenerate_data() {
        assert!(ErrorCalculator::convergence_order(&[1e-2], &[1e-4]).is_none());
        assert!(ErrorCalculator::convergence_order(&[1e-1, 1e-2], &[0.0, 0.0]).is_none());
        assert!(
            ErrorCalculator::convergence_order(&[1e-2, 1e-2], &[1e-4, 1e-4]).is_none()
        );
    }

    #[test]
    fn unit_roundoff_ordering() {
        assert!(UNIT_ROUNDOFF_F64 < UNIT_ROUNDOFF_F32);
        assert!((UNIT_ROUNDOFF_F32 - 1.1920929e-7).abs() < 1e-14);
    }
}
