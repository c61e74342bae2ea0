//! K-means clustering engine
//!
//! Points are partitioned by nearest centroid, where distances are squared
//! Euclidean distances over min-max normalized features. The feature ranges
//! are computed once per run from the raw input and threaded through every
//! distance computation, so concurrent runs never share state.

use ndarray::{Array2, ArrayView1};
use tracing::{debug, info};

use crate::error::{ClusterError, Result};
use crate::point::{Cluster, Point};
use crate::random::{shuffle, RandomSource};
use crate::range::FeatureRange;

/// Default number of update/assign rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Configuration for one clustering run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Number of update/assign rounds after the initial assignment
    pub max_iterations: usize,

    /// Stop once an assignment step moves no point. The partition is the same
    /// as running the full budget, since the centroids stop changing too.
    pub stop_when_stable: bool,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            stop_when_stable: false,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_stop_when_stable(mut self, stop_when_stable: bool) -> Self {
        self.stop_when_stable = stop_when_stable;
        self
    }
}

/// Outcome of a clustering run
#[derive(Debug, Clone)]
pub struct Clustering {
    clusters: Vec<Cluster>,
    assignments: Vec<usize>,
    centroids: Array2<f64>,
    iterations: usize,
    range: FeatureRange,
}

impl Clustering {
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Cluster index of every input point, in input order
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Centroids of the last assignment step, one row per cluster
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    /// Update/assign rounds actually performed
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn range(&self) -> &FeatureRange {
        &self.range
    }

    /// Sum of normalized squared distances from each point to its centroid
    pub fn within_cluster_ss(&self) -> f64 {
        self.clusters
            .iter()
            .enumerate()
            .flat_map(|(ci, cluster)| cluster.points().iter().map(move |p| (ci, p)))
            .map(|(ci, p)| {
                self.range
                    .squared_distance(ArrayView1::from(p.features()), self.centroids.row(ci))
            })
            .sum()
    }
}

/// Runs k-means with a fixed configuration
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: KMeansConfig,
}

impl ClusterEngine {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Partition `points` into exactly `k` clusters
    pub fn cluster<S: RandomSource + ?Sized>(
        &self,
        points: &[Point],
        source: &mut S,
    ) -> Result<Vec<Cluster>> {
        Ok(self.run(points, source)?.into_clusters())
    }

    /// Like [`ClusterEngine::cluster`], keeping assignments and centroids
    pub fn run<S: RandomSource + ?Sized>(
        &self,
        points: &[Point],
        source: &mut S,
    ) -> Result<Clustering> {
        let k = self.config.k;
        let dim = validate(points, k)?;

        let data = Array2::from_shape_fn((points.len(), dim), |(i, d)| points[i].features()[d]);
        let range = FeatureRange::compute(&data)?;

        let degenerate = range.degenerate_dims();
        if !degenerate.is_empty() {
            debug!("Zero-range dimensions {:?} normalize to 0", degenerate);
        }

        // Random selection of k initial centroids
        let mut order: Vec<usize> = (0..points.len()).collect();
        shuffle(&mut order, source);

        let mut centroids = Array2::<f64>::zeros((k, dim));
        for (ci, &idx) in order.iter().take(k).enumerate() {
            centroids.row_mut(ci).assign(&data.row(idx));
        }

        let mut assignments = assign(&data, &centroids, &range);
        let mut iterations = 0;

        for iteration in 0..self.config.max_iterations {
            centroids = update_centroids(&data, &assignments, &centroids);
            let next = assign(&data, &centroids, &range);
            iterations += 1;

            let moved = next
                .iter()
                .zip(&assignments)
                .filter(|(a, b)| a != b)
                .count();
            debug!("Iteration {}: {} points changed cluster", iteration, moved);

            assignments = next;
            if moved == 0 && self.config.stop_when_stable {
                debug!("Assignments stable after {} iterations", iterations);
                break;
            }
        }

        let mut members: Vec<Vec<Point>> = vec![Vec::new(); k];
        for (point, &c) in points.iter().zip(&assignments) {
            members[c].push(point.clone());
        }

        let clusters: Vec<Cluster> = members
            .into_iter()
            .enumerate()
            .map(|(ci, pts)| Cluster::new(Point::centroid(centroids.row(ci).to_vec()), pts))
            .collect();

        info!(
            "Clustered {} points into {} clusters in {} iterations",
            points.len(),
            k,
            iterations
        );

        Ok(Clustering {
            clusters,
            assignments,
            centroids,
            iterations,
            range,
        })
    }
}

/// Partition `points` into `k` clusters with `max_iterations` refinement rounds
pub fn cluster<S: RandomSource + ?Sized>(
    points: &[Point],
    k: usize,
    max_iterations: usize,
    source: &mut S,
) -> Result<Vec<Cluster>> {
    ClusterEngine::new(KMeansConfig::new(k).with_max_iterations(max_iterations))
        .cluster(points, source)
}

/// Reject bad input before iterating; returns the shared dimension
fn validate(points: &[Point], k: usize) -> Result<usize> {
    if points.is_empty() {
        return Err(ClusterError::InvalidArgument(
            "no points to cluster".to_string(),
        ));
    }
    if k == 0 || k > points.len() {
        return Err(ClusterError::InvalidArgument(format!(
            "k must be between 1 and {}, got {}",
            points.len(),
            k
        )));
    }

    let dim = points[0].dim();
    if dim == 0 {
        return Err(ClusterError::InvalidArgument(
            "points have no features".to_string(),
        ));
    }

    for p in points {
        if p.dim() != dim {
            return Err(ClusterError::InvalidArgument(format!(
                "point {} has {} features, expected {}",
                p.id(),
                p.dim(),
                dim
            )));
        }
        if let Some((d, &value)) = p.features().iter().enumerate().find(|(_, x)| !x.is_finite()) {
            return Err(ClusterError::NonFiniteFeature {
                id: p.id(),
                dimension: d,
                value,
            });
        }
    }

    Ok(dim)
}

/// Index of the nearest centroid for every row; the first minimum wins ties
fn assign(data: &Array2<f64>, centroids: &Array2<f64>, range: &FeatureRange) -> Vec<usize> {
    data.outer_iter()
        .map(|row| {
            let mut best_cluster = 0;
            let mut best_dist = f64::INFINITY;

            for (ci, c_row) in centroids.outer_iter().enumerate() {
                let dist = range.squared_distance(row, c_row);
                if dist < best_dist {
                    best_dist = dist;
                    best_cluster = ci;
                }
            }
            best_cluster
        })
        .collect()
}

/// Per-dimension means of each cluster. An empty cluster keeps its
/// previous centroid rather than taking the undefined mean of no points.
/// Means are accumulated incrementally so they stay within the feature range
/// instead of overflowing through a running sum.
fn update_centroids(
    data: &Array2<f64>,
    assignments: &[usize],
    previous: &Array2<f64>,
) -> Array2<f64> {
    let k = previous.nrows();
    let mut centroids = Array2::<f64>::zeros(previous.raw_dim());
    let mut counts = vec![0usize; k];

    for (row, &c) in data.outer_iter().zip(assignments) {
        counts[c] += 1;
        let n = counts[c] as f64;
        centroids
            .row_mut(c)
            .zip_mut_with(&row, |mean, &x| *mean += (x - *mean) / n);
    }

    for ci in 0..k {
        if counts[ci] == 0 {
            debug!("Cluster {} is empty, keeping its previous centroid", ci);
            centroids.row_mut(ci).assign(&previous.row(ci));
        }
    }

    centroids
}
