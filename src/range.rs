//! Per-dimension min-max ranges used to normalize distances

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{ClusterError, Result};

/// Per-dimension (min, max) over a whole dataset, fixed for one clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRange {
    min: Array1<f64>,
    max: Array1<f64>,
}

impl FeatureRange {
    /// Compute the column ranges of a feature matrix (one row per point)
    pub fn compute(data: &Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(ClusterError::InvalidArgument(
                "cannot compute feature ranges of an empty dataset".to_string(),
            ));
        }

        let min = data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));

        // spans must be representable, otherwise normalization yields inf/inf
        if let Some(d) = (0..min.len()).find(|&d| !(max[d] - min[d]).is_finite()) {
            return Err(ClusterError::InvalidArgument(format!(
                "range of dimension {} ({} to {}) overflows f64",
                d, min[d], max[d]
            )));
        }

        Ok(Self { min, max })
    }

    pub fn dim(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self, dim: usize) -> f64 {
        self.min[dim]
    }

    pub fn max(&self, dim: usize) -> f64 {
        self.max[dim]
    }

    /// Min-max normalize a raw value; zero-range dimensions map to 0
    #[inline]
    pub fn normalize(&self, dim: usize, raw: f64) -> f64 {
        let span = self.max[dim] - self.min[dim];
        if span == 0.0 {
            return 0.0;
        }
        (raw - self.min[dim]) / span
    }

    pub fn normalize_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        Array1::from_iter(row.iter().enumerate().map(|(d, &x)| self.normalize(d, x)))
    }

    /// Dimensions where every point holds the same value
    pub fn degenerate_dims(&self) -> Vec<usize> {
        (0..self.dim())
            .filter(|&d| self.max[d] == self.min[d])
            .collect()
    }

    /// Squared Euclidean distance between two raw vectors after normalization
    #[inline]
    pub fn squared_distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), self.dim());
        debug_assert_eq!(b.len(), self.dim());
        a.iter()
            .zip(b.iter())
            .enumerate()
            .map(|(d, (&x, &y))| (self.normalize(d, x) - self.normalize(d, y)).powi(2))
            .sum()
    }
}
