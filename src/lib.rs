//! K-means clustering of postcode census data
//!
//! Points are grouped by nearest centroid over min-max normalized features,
//! with an injectable random source for reproducible initialization.

mod dataset;
mod engine;
mod error;
mod point;
mod random;
mod range;

pub use dataset::DataSet;
pub use engine::{cluster, ClusterEngine, Clustering, KMeansConfig, DEFAULT_MAX_ITERATIONS};
pub use error::{ClusterError, Result};
pub use point::{Cluster, Point, CENSUS_FEATURES, CENTROID_ID};
pub use random::{shuffle, FixedSequence, RandomSource, RngSource};
pub use range::FeatureRange;
