//! Nominatim HTTP adapter for geocoding.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::resolver::ResolvedLocation;
use crate::traits::Geocoder;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim rejects requests without an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "route-optimizer/0.1";

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl NominatimConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>> {
        let url = self.search_url();
        debug!(%url, query, "geocoding request");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .map_err(|err| request_error(err, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::GeocodeService(format!("{url} returned {status}")));
        }

        let places: Vec<Place> = response.json().map_err(|err| {
            if err.is_timeout() {
                request_error(err, &url)
            } else {
                Error::invalid_response("nominatim", err.to_string())
            }
        })?;

        places.into_iter().next().map(Place::into_location).transpose()
    }
}

fn request_error(err: reqwest::Error, url: &str) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            url: url.to_string(),
        }
    } else {
        Error::GeocodeService(err.to_string())
    }
}

/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

impl Place {
    fn into_location(self) -> Result<ResolvedLocation> {
        let parse = |value: &str, field: &str| {
            value.trim().parse::<f64>().map_err(|err| {
                Error::invalid_response("nominatim", format!("bad {field} {value:?}: {err}"))
            })
        };

        Ok(ResolvedLocation {
            point: Point::new(parse(&self.lat, "lat")?, parse(&self.lon, "lon")?),
            label: self.display_name,
        })
    }
}
