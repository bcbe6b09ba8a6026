//! Geographic points and point sequences.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
///
/// Serializes as a two-element `[lat, lon]` array, the same shape used
/// for saved point lists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

/// Ordered stops. Index 0 is the origin when ordering is requested.
pub type PointSequence = Vec<Point>;

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance treating (lat, lon) as 2-D coordinates.
    ///
    /// No geodesic correction; only meaningful for comparing orderings.
    /// Computed as `sqrt(dx² + dy²)` so equal-length legs round identically.
    pub fn euclidean(&self, other: &Point) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// `lon,lat` as expected in routing service paths.
    pub fn to_lon_lat(&self) -> String {
        format!("{:.6},{:.6}", self.lon, self.lat)
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.lat, point.lon)
    }
}
