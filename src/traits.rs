//! Seams for the external services.
//!
//! HTTP adapters live in `osrm` and `nominatim`; tests and callers can
//! substitute their own implementations.

use crate::error::Result;
use crate::osrm::RouteResult;
use crate::point::Point;
use crate::resolver::ResolvedLocation;

/// Retrieves a road-following route through points in the given order.
///
/// One call is one request; retrying is layered above (see `retry`).
pub trait RouteProvider {
    fn route_for(&self, points: &[Point]) -> Result<RouteResult>;
}

/// One geocoding attempt for a free-text query.
///
/// `Ok(None)` means the service answered but found nothing.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>>;
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn route_for(&self, points: &[Point]) -> Result<RouteResult> {
        (**self).route_for(points)
    }
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>> {
        (**self).geocode(query)
    }
}
