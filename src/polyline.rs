//! Route geometry as returned by the routing service, and its decoded
//! (lat, lon) path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::point::Point;

/// GeoJSON geometry object, kept exactly as the routing service sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteGeometry(Value);

#[derive(Deserialize)]
struct LineString {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    pub fn new(geojson: Value) -> Self {
        Self(geojson)
    }

    pub fn as_geojson(&self) -> &Value {
        &self.0
    }

    pub fn into_geojson(self) -> Value {
        self.0
    }

    /// Decode a GeoJSON `LineString` into a path of points.
    ///
    /// GeoJSON positions are `[lon, lat]`; the result is in (lat, lon).
    /// `None` for any other geometry type or malformed coordinates.
    pub fn polyline(&self) -> Option<Polyline> {
        let line = LineString::deserialize(&self.0).ok()?;
        if line.kind != "LineString" {
            return None;
        }
        Some(Polyline::new(
            line.coordinates
                .into_iter()
                .map(|[lon, lat]| Point::new(lat, lon))
                .collect(),
        ))
    }
}

/// A road-following path as an ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
