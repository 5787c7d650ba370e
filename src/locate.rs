//! Single-shot user geolocation
//!
//! A terminal has no browser geolocation API, so the user's position comes
//! from explicit coordinates, an IP geolocation lookup, or nowhere at all.
//! Each request resolves exactly once: a coordinate, or a `LocationError`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::geo::Coordinate;

/// Default IP geolocation endpoint
pub const DEFAULT_GEO_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Default advisory timeout for a location request
pub const DEFAULT_GEO_TIMEOUT: Duration = Duration::from_secs(7);

/// Why a location request did not produce coordinates
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// No location source is configured
    #[error("Location is not available")]
    Unavailable,

    /// The source answered but refused or failed to locate the user
    #[error("Location request denied: {0}")]
    Denied(String),

    /// The source did not answer within the advisory timeout
    #[error("Location request timed out after {0:?}")]
    TimedOut(Duration),
}

/// Response from the IP geolocation service
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Where the user's coordinates come from
#[derive(Debug, Clone)]
pub enum LocationSource {
    /// Coordinates supplied on the command line
    Fixed(Coordinate),
    /// Approximate location from the public IP address
    IpLookup { client: Client, url: String },
    /// Location lookups are turned off
    Disabled,
}

impl LocationSource {
    /// IP lookup against the given endpoint
    pub fn ip_lookup(url: impl Into<String>) -> Self {
        LocationSource::IpLookup {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Resolves the user's location once.
    ///
    /// `timeout` bounds the whole request; when it elapses the request is
    /// abandoned and `LocationError::TimedOut` is returned.
    pub async fn locate(&self, timeout: Duration) -> Result<Coordinate, LocationError> {
        match self {
            LocationSource::Fixed(coordinate) => Ok(*coordinate),
            LocationSource::Disabled => Err(LocationError::Unavailable),
            LocationSource::IpLookup { client, url } => {
                tokio::time::timeout(timeout, lookup_ip(client, url))
                    .await
                    .map_err(|_| LocationError::TimedOut(timeout))?
            }
        }
    }
}

async fn lookup_ip(client: &Client, url: &str) -> Result<Coordinate, LocationError> {
    debug!(url, "looking up location from IP address");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LocationError::Denied(e.to_string()))?;

    if !response.status().is_success() {
        return Err(LocationError::Denied(format!(
            "HTTP status {}",
            response.status().as_u16()
        )));
    }

    let body: IpLookupResponse = response
        .json()
        .await
        .map_err(|e| LocationError::Denied(format!("unreadable response: {}", e)))?;

    if body.status != "success" {
        return Err(LocationError::Denied(
            body.message.unwrap_or_else(|| body.status.clone()),
        ));
    }

    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => {
            Coordinate::try_new(lat, lon).map_err(|e| LocationError::Denied(e.to_string()))
        }
        _ => Err(LocationError::Denied(
            "response has no coordinates".to_string(),
        )),
    }
}
