//! Static region data for Taiwan's administrative divisions
//!
//! This module contains the fixed table of the 22 cities and counties covered
//! by the weather feed, each with an approximate centroid used to match a
//! user's location to the closest region.

use std::collections::HashSet;

use thiserror::Error;

use super::Region;
use crate::geo::{distance_km, Coordinate};

/// Errors from region lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Nearest-region search was given no usable candidates
    #[error("No candidate regions to match against")]
    NoCandidates,
}

/// Static array of all regions, in the curated display order
///
/// Names match the identifiers used by the weather feed.
pub static REGIONS: [Region; 22] = [
    Region {
        name: "基隆市",
        english_name: "Keelung City",
        centroid: Coordinate::new(25.128, 121.739),
    },
    Region {
        name: "臺北市",
        english_name: "Taipei City",
        centroid: Coordinate::new(25.033, 121.565),
    },
    Region {
        name: "新北市",
        english_name: "New Taipei City",
        centroid: Coordinate::new(25.016, 121.462),
    },
    Region {
        name: "桃園市",
        english_name: "Taoyuan City",
        centroid: Coordinate::new(24.993, 121.300),
    },
    Region {
        name: "新竹市",
        english_name: "Hsinchu City",
        centroid: Coordinate::new(24.803, 120.967),
    },
    Region {
        name: "新竹縣",
        english_name: "Hsinchu County",
        centroid: Coordinate::new(24.838, 121.028),
    },
    Region {
        name: "苗栗縣",
        english_name: "Miaoli County",
        centroid: Coordinate::new(24.559, 120.822),
    },
    Region {
        name: "臺中市",
        english_name: "Taichung City",
        centroid: Coordinate::new(24.147, 120.673),
    },
    Region {
        name: "彰化縣",
        english_name: "Changhua County",
        centroid: Coordinate::new(24.055, 120.538),
    },
    Region {
        name: "南投縣",
        english_name: "Nantou County",
        centroid: Coordinate::new(23.838, 120.987),
    },
    Region {
        name: "雲林縣",
        english_name: "Yunlin County",
        centroid: Coordinate::new(23.707, 120.389),
    },
    Region {
        name: "嘉義市",
        english_name: "Chiayi City",
        centroid: Coordinate::new(23.480, 120.449),
    },
    Region {
        name: "嘉義縣",
        english_name: "Chiayi County",
        centroid: Coordinate::new(23.460, 120.241),
    },
    Region {
        name: "臺南市",
        english_name: "Tainan City",
        centroid: Coordinate::new(23.000, 120.227),
    },
    Region {
        name: "高雄市",
        english_name: "Kaohsiung City",
        centroid: Coordinate::new(22.627, 120.301),
    },
    Region {
        name: "屏東縣",
        english_name: "Pingtung County",
        centroid: Coordinate::new(22.676, 120.487),
    },
    Region {
        name: "宜蘭縣",
        english_name: "Yilan County",
        centroid: Coordinate::new(24.702, 121.737),
    },
    Region {
        name: "花蓮縣",
        english_name: "Hualien County",
        centroid: Coordinate::new(23.976, 121.604),
    },
    Region {
        name: "臺東縣",
        english_name: "Taitung County",
        centroid: Coordinate::new(22.757, 121.144),
    },
    Region {
        name: "澎湖縣",
        english_name: "Penghu County",
        centroid: Coordinate::new(23.566, 119.583),
    },
    Region {
        name: "金門縣",
        english_name: "Kinmen County",
        centroid: Coordinate::new(24.432, 118.318),
    },
    Region {
        name: "連江縣",
        english_name: "Lienchiang County",
        centroid: Coordinate::new(26.159, 119.941),
    },
];

/// Get a region by its canonical feed name (e.g. "臺北市")
pub fn get_region_by_name(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|region| region.name == name)
}

/// Resolve user input to a region.
///
/// Accepts the canonical name, or the English name compared case-insensitively
/// ("taipei city"). Leading and trailing whitespace is ignored.
pub fn find_region(query: &str) -> Option<&'static Region> {
    let query = query.trim();
    get_region_by_name(query).or_else(|| {
        REGIONS
            .iter()
            .find(|region| region.english_name.eq_ignore_ascii_case(query))
    })
}

/// Get all regions in declaration order
pub fn all_regions() -> &'static [Region] {
    &REGIONS
}

/// Finds the region among `candidates` whose centroid is closest to `point`.
///
/// The table is scanned in declaration order and only a strictly smaller
/// distance replaces the current best, so equidistant regions resolve to the
/// one declared first. Names in `candidates` that are not in the table are
/// ignored.
///
/// # Errors
/// `RegionError::NoCandidates` when no table entry is in `candidates`.
pub fn nearest(
    point: Coordinate,
    candidates: &HashSet<&str>,
) -> Result<&'static Region, RegionError> {
    nearest_in(&REGIONS, point, candidates).ok_or(RegionError::NoCandidates)
}

fn nearest_in<'a>(
    table: &'a [Region],
    point: Coordinate,
    candidates: &HashSet<&str>,
) -> Option<&'a Region> {
    let mut best: Option<(&'a Region, f64)> = None;

    for region in table.iter().filter(|r| candidates.contains(r.name)) {
        let d = distance_km(point, region.centroid);
        match best {
            Some((_, best_distance)) if d >= best_distance => {}
            _ => best = Some((region, d)),
        }
    }

    best.map(|(region, _)| region)
}

/// Returns the regions present in `candidates`, in declaration order
pub fn ordered_regions(candidates: &HashSet<&str>) -> Vec<&'static Region> {
    REGIONS
        .iter()
        .filter(|region| candidates.contains(region.name))
        .collect()
}
