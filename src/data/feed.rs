//! Aggregated weather feed client
//!
//! Fetches the all-regions weather feed and normalizes it into an immutable
//! [`Snapshot`] keyed by region. The [`WeatherRepository`] holds the latest
//! successful snapshot and only replaces it when a refresh fully succeeds.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::region::{get_region_by_name, ordered_regions};
use super::{ForecastBlock, Region, WeatherRecord};

/// Default endpoint of the aggregated feed
pub const DEFAULT_FEED_URL: &str = "https://freeweather.zeabur.app/api/weather/all";

/// Default request timeout for the feed
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when refreshing the feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Feed returned HTTP status {0}")]
    Status(u16),

    /// Payload was not the expected shape, or the source reported failure
    #[error("Invalid feed response: {0}")]
    InvalidResponse(String),

    /// Payload parsed but contained no usable records
    #[error("Feed contained no usable records")]
    EmptyResponse,
}

impl FeedError {
    /// Soft failures leave the dashboard usable with its previous data
    pub fn is_soft(&self) -> bool {
        matches!(self, FeedError::EmptyResponse)
    }
}

/// Immutable view of one successful feed refresh
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: HashMap<&'static str, WeatherRecord>,
    fetch_order: Vec<&'static str>,
    fetched_at: Option<DateTime<Local>>,
}

impl Snapshot {
    /// Builds a snapshot from records; the first record for a region wins
    pub fn from_records(records: impl IntoIterator<Item = WeatherRecord>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            let name = record.region.name;
            if snapshot.records.contains_key(name) {
                debug!(region = name, "ignoring duplicate feed row");
                continue;
            }
            snapshot.fetch_order.push(name);
            snapshot.records.insert(name, record);
        }
        snapshot
    }

    fn stamped(mut self, fetched_at: DateTime<Local>) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    /// Looks up the record for a region name
    pub fn get(&self, name: &str) -> Option<&WeatherRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Region names present in this snapshot
    pub fn region_names(&self) -> HashSet<&'static str> {
        self.records.keys().copied().collect()
    }

    /// Region names in the order the feed listed them
    pub fn fetch_order(&self) -> &[&'static str] {
        &self.fetch_order
    }

    /// Regions present in this snapshot, in the curated display order
    pub fn ordered_regions(&self) -> Vec<&'static Region> {
        ordered_regions(&self.region_names())
    }

    /// When the feed was fetched, if this snapshot came from the network
    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }
}

/// Feed row as sent by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedRow {
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    update_time: Option<String>,
    #[serde(default)]
    forecasts: Option<Value>,
}

/// Forecast block as sent by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedBlock {
    #[serde(default, deserialize_with = "lenient_text")]
    start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    weather: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    min_temp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    max_temp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    rain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    comfort: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    wind_speed: Option<String>,
}

impl From<FeedBlock> for ForecastBlock {
    fn from(block: FeedBlock) -> Self {
        ForecastBlock {
            start_time: block.start_time,
            end_time: block.end_time,
            weather: block.weather,
            min_temp: block.min_temp,
            max_temp: block.max_temp,
            rain: block.rain,
            comfort: block.comfort,
            wind_speed: block.wind_speed,
        }
    }
}

/// Accepts strings and numbers as text; anything else, and empty strings, are absent
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parses and normalizes a feed body into a snapshot.
///
/// Rows without a recognized region are dropped; rows without forecasts are
/// kept with no blocks.
///
/// # Errors
/// * `FeedError::InvalidResponse` - not a JSON object, `success` is not `true`,
///   or `data` is not an array
/// * `FeedError::EmptyResponse` - no usable rows remain
pub fn parse_feed(body: &str) -> Result<Snapshot, FeedError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FeedError::InvalidResponse(format!("malformed JSON: {}", e)))?;

    let Value::Object(mut envelope) = value else {
        return Err(FeedError::InvalidResponse(
            "expected a JSON object".to_string(),
        ));
    };

    match envelope.get("success") {
        Some(Value::Bool(true)) => {}
        Some(Value::Bool(false)) => {
            return Err(FeedError::InvalidResponse(
                "source reported failure".to_string(),
            ))
        }
        _ => {
            return Err(FeedError::InvalidResponse(
                "missing success flag".to_string(),
            ))
        }
    }

    let rows = match envelope.remove("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows,
        Some(_) => {
            return Err(FeedError::InvalidResponse(
                "data is not an array".to_string(),
            ))
        }
    };

    let total = rows.len();
    let snapshot = Snapshot::from_records(rows.into_iter().filter_map(normalize_row));
    if snapshot.is_empty() {
        return Err(FeedError::EmptyResponse);
    }

    if snapshot.len() < total {
        debug!(
            kept = snapshot.len(),
            dropped = total - snapshot.len(),
            "normalized feed rows"
        );
    }

    Ok(snapshot.stamped(Local::now()))
}

/// Converts one raw row into a record, or `None` if it must be dropped
fn normalize_row(row: Value) -> Option<WeatherRecord> {
    let row: FeedRow = match serde_json::from_value(row) {
        Ok(row) => row,
        Err(e) => {
            debug!(error = %e, "dropping malformed feed row");
            return None;
        }
    };

    let Some(city) = row.city else {
        debug!("dropping feed row without a region");
        return None;
    };
    let Some(region) = get_region_by_name(&city) else {
        debug!(region = %city, "dropping feed row for unknown region");
        return None;
    };

    let forecasts = match row.forecasts {
        Some(Value::Array(blocks)) => blocks
            .into_iter()
            .filter_map(|block| serde_json::from_value::<FeedBlock>(block).ok())
            .map(ForecastBlock::from)
            .collect(),
        _ => Vec::new(),
    };

    Some(WeatherRecord {
        region,
        update_time: row.update_time,
        forecasts,
    })
}

/// HTTP client for the aggregated feed
#[derive(Debug, Clone)]
pub struct FeedClient {
    http_client: Client,
    endpoint: String,
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

impl FeedClient {
    /// Creates a client for the given endpoint with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_FETCH_TIMEOUT)
    }

    /// Creates a client for the given endpoint with a custom request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                Client::new()
            });
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches and normalizes the feed
    ///
    /// # Returns
    /// * `Ok(Snapshot)` - at least one usable record
    /// * `Err(FeedError)` - transport, status, shape or empty-payload failure
    pub async fn fetch(&self) -> Result<Snapshot, FeedError> {
        debug!(endpoint = %self.endpoint, "fetching weather feed");

        let response = self.http_client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_feed(&body)
    }
}

/// Owns the feed client and the latest successful snapshot
#[derive(Debug)]
pub struct WeatherRepository {
    client: FeedClient,
    current: Arc<Snapshot>,
}

impl WeatherRepository {
    /// Creates a repository with an empty snapshot
    pub fn new(client: FeedClient) -> Self {
        Self {
            client,
            current: Arc::new(Snapshot::default()),
        }
    }

    /// The most recent successful snapshot (empty before the first refresh)
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Fetches the feed and, on success, replaces the held snapshot.
    ///
    /// On any error the previous snapshot is kept as-is.
    pub async fn refresh(&mut self) -> Result<Arc<Snapshot>, FeedError> {
        let snapshot = match self.client.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, endpoint = %self.client.endpoint(), "feed refresh failed");
                return Err(e);
            }
        };

        info!(regions = snapshot.len(), "weather feed refreshed");
        self.current = Arc::new(snapshot);
        Ok(self.snapshot())
    }
}
