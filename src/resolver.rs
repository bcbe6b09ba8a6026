//! Address to coordinate resolution with retry on timeout.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::nominatim::{NominatimClient, NominatimConfig};
use crate::point::Point;
use crate::retry::{retry, CancelToken, RetryPolicy};
use crate::traits::Geocoder;

/// A geocoded location and the address the service matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub point: Point,
    pub label: String,
}

/// Resolves free-text queries through a [`Geocoder`].
///
/// Only timeouts are retried. A "no match" answer or any other failure
/// ends resolution on the spot.
#[derive(Debug, Clone)]
pub struct LocationResolver<G> {
    geocoder: G,
    policy: RetryPolicy,
}

impl LocationResolver<NominatimClient> {
    pub fn nominatim(config: NominatimConfig) -> Result<Self> {
        Ok(Self::new(NominatimClient::new(config)?))
    }
}

impl<G: Geocoder> LocationResolver<G> {
    /// Uses [`RetryPolicy::geocoding`]: three attempts, two seconds apart.
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            policy: RetryPolicy::geocoding(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn resolve(&self, query: &str) -> Result<ResolvedLocation> {
        self.resolve_with_cancel(query, &CancelToken::new())
    }

    pub fn resolve_with_cancel(&self, query: &str, cancel: &CancelToken) -> Result<ResolvedLocation> {
        let outcome = retry(
            &self.policy,
            cancel,
            |err| matches!(err, Error::Timeout { .. }),
            |attempt| {
                debug!(attempt, query, "geocoding");
                self.geocoder.geocode(query)
            },
        );

        match outcome {
            Ok(Some(location)) => {
                info!(query, label = %location.label, "resolved location");
                Ok(location)
            }
            Ok(None) => Err(Error::GeocodeNotFound {
                query: query.to_string(),
            }),
            Err(Error::Timeout { .. }) => Err(Error::GeocodeTimeout {
                attempts: self.policy.max_attempts.max(1),
            }),
            Err(err) => Err(err),
        }
    }
}
