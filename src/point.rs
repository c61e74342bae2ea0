//! Labeled feature vectors and the clusters built from them

/// Identifier carried by synthetic centroid points. Reserved: a data point
/// built with this id is indistinguishable from a centroid.
pub const CENTROID_ID: i64 = -1;

/// Feature names of a census point, in feature order
pub const CENSUS_FEATURES: [&str; 3] = ["inhabitants", "maleInhabitants", "femaleInhabitants"];

/// A labeled numeric feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: i64,
    features: Vec<f64>,
}

impl Point {
    pub fn new(id: i64, features: Vec<f64>) -> Self {
        Self { id, features }
    }

    /// Synthetic point standing for a cluster center
    pub fn centroid(features: Vec<f64>) -> Self {
        Self::new(CENTROID_ID, features)
    }

    /// Postcode record with total, male and female inhabitants
    pub fn from_census(post_code: i64, inhabitants: f64, male: f64, female: f64) -> Self {
        Self::new(post_code, vec![inhabitants, male, female])
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn dim(&self) -> usize {
        self.features.len()
    }

    /// True for any point carrying [`CENTROID_ID`], which data points must not use
    pub fn is_centroid(&self) -> bool {
        self.id == CENTROID_ID
    }
}

/// Points sharing one centroid after the last assignment step
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    centroid: Point,
    points: Vec<Point>,
}

impl Cluster {
    pub fn new(centroid: Point, points: Vec<Point>) -> Self {
        Self { centroid, points }
    }

    /// Centroid the members were assigned to
    pub fn centroid(&self) -> &Point {
        &self.centroid
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Member identifiers in assignment order
    pub fn ids(&self) -> Vec<i64> {
        self.points.iter().map(Point::id).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
