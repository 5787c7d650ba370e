//! Command-line interface parsing for the Taiwan weather dashboard
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `StartupConfig`: feed endpoint, preferred region, where the
//! user's location comes from, timeouts and the log file.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::feed::{DEFAULT_FEED_URL, DEFAULT_FETCH_TIMEOUT};
use crate::data::{find_region, get_region_by_name, Region};
use crate::geo::{Coordinate, GeoError};
use crate::locate::{LocationSource, DEFAULT_GEO_TIMEOUT, DEFAULT_GEO_URL};

/// Region shown when location fails, if the feed has it
pub const DEFAULT_REGION: &str = "臺北市";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The region name is not one of the 22 regions
    #[error("Unknown region: '{0}'. Use a name such as 臺北市 or \"Taipei City\"")]
    UnknownRegion(String),

    /// Only one of --lat/--lon was given
    #[error("--lat and --lon must be given together")]
    IncompleteCoordinate,

    /// Coordinates are out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] GeoError),

    /// A timeout of zero seconds
    #[error("Timeout for {0} must be at least one second")]
    ZeroTimeout(&'static str),
}

/// Taiwan weather dashboard - current conditions and forecast for the nearest region
#[derive(Parser, Debug)]
#[command(name = "twweather")]
#[command(about = "Taiwan regional weather dashboard with nearest-region detection")]
#[command(version)]
pub struct Cli {
    /// Weather feed endpoint
    #[arg(long, env = "TWWEATHER_ENDPOINT", default_value = DEFAULT_FEED_URL)]
    pub endpoint: String,

    /// Region shown when the location is unknown (e.g. 臺北市 or "Taipei City")
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Your latitude in degrees; skips IP lookup (requires --lon)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Your longitude in degrees; skips IP lookup (requires --lat)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Do not try to determine your location
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub no_locate: bool,

    /// IP geolocation endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_GEO_URL)]
    pub geo_url: String,

    /// Seconds to wait for a location before falling back
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_GEO_TIMEOUT.as_secs())]
    pub geo_timeout: u64,

    /// Seconds to wait for the weather feed
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout: u64,

    /// Write logs here instead of the default cache directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Where the user's location will come from
#[derive(Debug, Clone, PartialEq)]
pub enum LocationMode {
    Fixed(Coordinate),
    IpLookup(String),
    Disabled,
}

impl LocationMode {
    /// Builds the runtime location source for this mode
    pub fn into_source(self) -> LocationSource {
        match self {
            LocationMode::Fixed(coordinate) => LocationSource::Fixed(coordinate),
            LocationMode::IpLookup(url) => LocationSource::ip_lookup(url),
            LocationMode::Disabled => LocationSource::Disabled,
        }
    }
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub endpoint: String,
    /// Preferred region when location fails
    pub default_region: &'static Region,
    pub location: LocationMode,
    pub geo_timeout: Duration,
    pub fetch_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FEED_URL.to_string(),
            default_region: default_region(),
            location: LocationMode::IpLookup(DEFAULT_GEO_URL.to_string()),
            geo_timeout: DEFAULT_GEO_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            log_file: None,
        }
    }
}

/// The built-in preferred region
pub fn default_region() -> &'static Region {
    // The table always contains the default; fall back to its first entry
    get_region_by_name(DEFAULT_REGION).unwrap_or(&crate::data::region::REGIONS[0])
}

/// Parses a region argument into a region.
///
/// # Returns
/// * `Ok(&Region)` if the name matches a region (canonical or English)
/// * `Err(CliError::UnknownRegion)` otherwise
pub fn parse_region_arg(s: &str) -> Result<&'static Region, CliError> {
    find_region(s).ok_or_else(|| CliError::UnknownRegion(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` for unknown regions, half or out-of-range
    ///   coordinates, or zero timeouts
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let default_region = match &cli.region {
            Some(name) => parse_region_arg(name)?,
            None => default_region(),
        };

        let location = match (cli.lat, cli.lon) {
            (Some(lat), Some(lon)) => LocationMode::Fixed(Coordinate::try_new(lat, lon)?),
            (None, None) if cli.no_locate => LocationMode::Disabled,
            (None, None) => LocationMode::IpLookup(cli.geo_url.clone()),
            _ => return Err(CliError::IncompleteCoordinate),
        };

        if cli.geo_timeout == 0 {
            return Err(CliError::ZeroTimeout("--geo-timeout"));
        }
        if cli.fetch_timeout == 0 {
            return Err(CliError::ZeroTimeout("--fetch-timeout"));
        }

        Ok(StartupConfig {
            endpoint: cli.endpoint.clone(),
            default_region,
            location,
            geo_timeout: Duration::from_secs(cli.geo_timeout),
            fetch_timeout: Duration::from_secs(cli.fetch_timeout),
            log_file: cli.log_file.clone(),
        })
    }
}
