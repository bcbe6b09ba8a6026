//! OSRM HTTP adapter for driving routes.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::point::Point;
use crate::polyline::RouteGeometry;
use crate::retry::{retry, CancelToken, RetryPolicy};
use crate::traits::RouteProvider;

pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSRM_URL.to_string(),
            profile: "driving".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl OsrmConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// First route of a successful routing response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub geometry: RouteGeometry,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

impl RouteResult {
    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration / 60.0
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    /// `{base}/route/v1/{profile}/{lon,lat;...}?overview=full&geometries=geojson`
    pub fn route_url(&self, points: &[Point]) -> String {
        let coords = points
            .iter()
            .map(Point::to_lon_lat)
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }

    /// Request a driving route through `points` in order. Single attempt.
    pub fn fetch(&self, points: &[Point]) -> Result<RouteResult> {
        if points.len() < 2 {
            return Err(Error::insufficient_points(points.len()));
        }

        let url = self.route_url(points);
        debug!(%url, "requesting route");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| transport_error(&err, &url))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RouteServiceUnavailable(format!(
                "{url} returned {status}"
            )));
        }

        // Client errors still carry a JSON body explaining the missing route.
        let body = response
            .text()
            .map_err(|err| transport_error(&err, &url))?;
        parse_route_response(&body)
    }

    /// [`fetch`](Self::fetch) retried on transport failures.
    pub fn fetch_with_retry(
        &self,
        points: &[Point],
        policy: &RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<RouteResult> {
        retry(policy, cancel, Error::is_transient, |_| self.fetch(points))
    }
}

impl RouteProvider for OsrmClient {
    fn route_for(&self, points: &[Point]) -> Result<RouteResult> {
        self.fetch(points)
    }
}

/// Decode a route response body, taking the first route.
pub fn parse_route_response(body: &str) -> Result<RouteResult> {
    let response: RouteResponse =
        serde_json::from_str(body).map_err(|err| Error::invalid_response("osrm", err.to_string()))?;

    let Some(route) = response.routes.into_iter().next() else {
        warn!(
            code = response.code.as_deref().unwrap_or(""),
            message = response.message.as_deref().unwrap_or(""),
            "routing service returned no routes"
        );
        return Err(Error::RouteNotFound {
            code: response.code,
        });
    };

    Ok(RouteResult {
        geometry: route.geometry,
        distance: route.distance,
        duration: route.duration,
    })
}

fn transport_error(err: &reqwest::Error, url: &str) -> Error {
    if err.is_timeout() {
        Error::RouteServiceUnavailable(format!("request to {url} timed out"))
    } else {
        Error::RouteServiceUnavailable(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: RouteGeometry,
    distance: f64,
    duration: f64,
}
