//! Error kinds shared by the solver, the routing client and the resolver.

use thiserror::Error;

use crate::point::Point;

#[derive(Debug, Error)]
pub enum Error {
    #[error("at least {required} points are required, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    /// Exhaustive search is factorial in the number of stops.
    #[error("{actual} points exceeds the exhaustive search limit of {max}")]
    TooManyPoints { max: usize, actual: usize },

    #[error("point {index} has a non-finite coordinate ({}, {})", .point.lat, .point.lon)]
    NonFinitePoint { index: usize, point: Point },

    #[error("no location found for {query:?}")]
    GeocodeNotFound { query: String },

    #[error("geocoding timed out after {attempts} attempt(s)")]
    GeocodeTimeout { attempts: usize },

    #[error("geocoding service failed: {0}")]
    GeocodeService(String),

    #[error("routing service unavailable: {0}")]
    RouteServiceUnavailable(String),

    #[error("routing service returned no route (code: {})", .code.as_deref().unwrap_or("none"))]
    RouteNotFound { code: Option<String> },

    #[error("invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    /// A single request exceeded its timeout.
    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to build solver pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn insufficient_points(actual: usize) -> Self {
        Self::InsufficientPoints {
            required: 2,
            actual,
        }
    }

    pub fn invalid_response(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }

    /// Whether a retry loop may try the failed call again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RouteServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(Error::Timeout { url: "http://x".into() }.is_transient());
        assert!(Error::RouteServiceUnavailable("503".into()).is_transient());
        assert!(!Error::RouteNotFound { code: None }.is_transient());
        assert!(!Error::GeocodeNotFound { query: "x".into() }.is_transient());
        assert!(!Error::Cancelled.is_transient());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::insufficient_points(1);
        assert_eq!(err.to_string(), "at least 2 points are required, got 1");

        let err = Error::RouteNotFound {
            code: Some("NoRoute".into()),
        };
        assert_eq!(err.to_string(), "routing service returned no route (code: NoRoute)");

        let err = Error::NonFinitePoint {
            index: 1,
            point: Point::new(f64::NAN, 2.0),
        };
        assert_eq!(err.to_string(), "point 1 has a non-finite coordinate (NaN, 2)");

        let err = Error::GeocodeTimeout { attempts: 3 };
        assert_eq!(err.to_string(), "geocoding timed out after 3 attempt(s)");
    }
}
