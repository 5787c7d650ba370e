//! Core data models for the Taiwan weather dashboard
//!
//! This module contains the static region table, the weather feed client and
//! the record types produced by normalizing the feed.

pub mod feed;
pub mod region;

pub use feed::{FeedClient, FeedError, Snapshot, WeatherRepository};
pub use region::{
    all_regions, find_region, get_region_by_name, nearest, ordered_regions, RegionError,
};

use crate::geo::Coordinate;

/// One of Taiwan's 22 cities and counties
///
/// Uses `&'static str` fields so the table can be initialized statically;
/// records produced from the feed point back into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Canonical name, identical to the feed's region identifier
    pub name: &'static str,
    /// English name used for lookups and terminal display
    pub english_name: &'static str,
    /// Representative location used for nearest-region matching
    pub centroid: Coordinate,
}

/// A single time window of a region's forecast
///
/// Every field is optional: the feed is free text and any value may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastBlock {
    /// Start of the window, e.g. "2025-01-01 06:00:00"
    pub start_time: Option<String>,
    /// End of the window
    pub end_time: Option<String>,
    /// Weather description, e.g. "多雲時晴"
    pub weather: Option<String>,
    /// Minimum temperature, usually with a unit suffix ("18°C")
    pub min_temp: Option<String>,
    /// Maximum temperature, usually with a unit suffix ("25°C")
    pub max_temp: Option<String>,
    /// Probability of precipitation in percent
    pub rain: Option<String>,
    /// Comfort index description
    pub comfort: Option<String>,
    /// Wind speed description
    pub wind_speed: Option<String>,
}

/// Weather feed entry for one region
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    /// The region this record belongs to
    pub region: &'static Region,
    /// Feed-provided update timestamp
    pub update_time: Option<String>,
    /// Forecast windows in feed order; may be empty
    pub forecasts: Vec<ForecastBlock>,
}

impl WeatherRecord {
    /// The block treated as current conditions
    pub fn current(&self) -> Option<&ForecastBlock> {
        self.forecasts.first()
    }
}
