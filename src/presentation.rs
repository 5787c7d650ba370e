//! Mapping from feed records to display-ready view models
//!
//! Everything here is a pure function of a [`WeatherRecord`]: no I/O and no
//! shared state. Absent or unparseable values become [`MISSING`].

use crate::data::{ForecastBlock, WeatherRecord};

/// Placeholder shown for absent or unparseable values
pub const MISSING: &str = "—";

/// Number of forecast blocks shown as cards
pub const MAX_FORECAST_CARDS: usize = 3;

/// Rain probability (%) at or above which rain gear is strongly advised
const RAIN_HEAVY_THRESHOLD: i64 = 60;
/// Rain probability (%) at or above which light rain gear is suggested
const RAIN_LIGHT_THRESHOLD: i64 = 30;
/// Maximum temperature (°C) at or below which a coat is advised
const COLD_MAX_TEMP: i64 = 15;
/// Maximum temperature (°C) at or below which a light layer is advised
const COOL_MAX_TEMP: i64 = 20;
/// Stand-in for an unparseable maximum temperature; lands in the warm tier
const UNPARSED_MAX_TEMP: i64 = 999;

pub const ADVICE_RAIN_HEAVY: &str = "外出請攜帶雨具，路面注意溼滑。";
pub const ADVICE_RAIN_LIGHT: &str = "偶有短時雨，外出建議帶輕便雨具。";
pub const ADVICE_RAIN_STABLE: &str = "天氣穩定，適合外出活動。";
pub const ADVICE_TEMP_COLD: &str = "氣溫偏低，建議多穿一件外套。";
pub const ADVICE_TEMP_COOL: &str = "晚間或早晨稍涼，建議備件薄外套。";
pub const ADVICE_TEMP_WARM: &str = "溫暖舒適，輕鬆外出即可。";

/// Weather categories, each with its own icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCategory {
    Sunny,
    Rain,
    Overcast,
    PartlyCloudy,
    Thunder,
    Snow,
    /// Fog, and anything no rule recognizes
    Fog,
}

impl WeatherCategory {
    pub fn icon(self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "\u{2600}",         // ☀
            WeatherCategory::Rain => "\u{1F327}",         // 🌧
            WeatherCategory::Overcast => "\u{2601}",      // ☁
            WeatherCategory::PartlyCloudy => "\u{26C5}",  // ⛅
            WeatherCategory::Thunder => "\u{26C8}",       // ⛈
            WeatherCategory::Snow => "\u{2744}",          // ❄
            WeatherCategory::Fog => "\u{1F32B}",          // 🌫
        }
    }
}

/// Keyword rules, checked top to bottom; the first rule with a matching
/// keyword decides the category.
///
/// Descriptions often combine terms ("多雲時晴", "雷陣雨"), so the order is
/// part of the contract: a thunderstorm with rain reads as rain.
pub const CATEGORY_RULES: &[(WeatherCategory, &[&str])] = &[
    (WeatherCategory::Sunny, &["晴"]),
    (WeatherCategory::Rain, &["雨", "陣雨", "短暫雨"]),
    (WeatherCategory::Overcast, &["陰"]),
    (WeatherCategory::PartlyCloudy, &["多雲"]),
    (WeatherCategory::Thunder, &["雷"]),
    (WeatherCategory::Snow, &["雪"]),
];

/// Classifies a free-text weather description
pub fn classify(description: &str) -> WeatherCategory {
    let description = description.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| description.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(WeatherCategory::Fog)
}

/// One forecast window, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCard {
    /// Date part of the start time, empty when unknown
    pub date_label: String,
    pub icon: &'static str,
    pub category: WeatherCategory,
    pub description: String,
    pub rain: String,
    /// "min / max"
    pub temperature_range: String,
    pub comfort: String,
}

/// Display fields for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub region_name: &'static str,
    pub english_name: &'static str,
    pub update_time: String,
    /// Icon of the current block, or [`MISSING`]
    pub icon: &'static str,
    /// Category of the current block; `None` without forecasts
    pub category: Option<WeatherCategory>,
    pub description: String,
    /// Maximum temperature without its unit
    pub display_temperature: String,
    /// "min — max"
    pub temperature_range: String,
    pub comfort: String,
    pub rain: String,
    pub wind_speed: String,
    pub advice: String,
    pub cards: Vec<ForecastCard>,
}

impl ViewModel {
    /// True when the record had no forecast blocks
    pub fn has_current(&self) -> bool {
        self.category.is_some()
    }
}

/// Projects a record into its view model
pub fn project(record: &WeatherRecord) -> ViewModel {
    let region = record.region;
    let update_time = text_or_missing(record.update_time.as_deref());

    let cards = record
        .forecasts
        .iter()
        .take(MAX_FORECAST_CARDS)
        .map(forecast_card)
        .collect();

    let Some(current) = record.current() else {
        return ViewModel {
            region_name: region.name,
            english_name: region.english_name,
            update_time,
            icon: MISSING,
            category: None,
            description: MISSING.to_string(),
            display_temperature: MISSING.to_string(),
            temperature_range: MISSING.to_string(),
            comfort: MISSING.to_string(),
            rain: MISSING.to_string(),
            wind_speed: MISSING.to_string(),
            advice: MISSING.to_string(),
            cards,
        };
    };

    let category = classify(current.weather.as_deref().unwrap_or_default());

    ViewModel {
        region_name: region.name,
        english_name: region.english_name,
        update_time,
        icon: category.icon(),
        category: Some(category),
        description: text_or_missing(current.weather.as_deref()),
        display_temperature: display_temperature(current.max_temp.as_deref()),
        temperature_range: format!(
            "{} — {}",
            text_or_missing(current.min_temp.as_deref()),
            text_or_missing(current.max_temp.as_deref())
        ),
        comfort: text_or_missing(current.comfort.as_deref()),
        rain: text_or_missing(current.rain.as_deref()),
        wind_speed: text_or_missing(current.wind_speed.as_deref()),
        advice: compose_advice(current),
        cards,
    }
}

fn forecast_card(block: &ForecastBlock) -> ForecastCard {
    let category = classify(block.weather.as_deref().unwrap_or_default());
    ForecastCard {
        date_label: block
            .start_time
            .as_deref()
            .map(date_label)
            .unwrap_or_default(),
        icon: category.icon(),
        category,
        description: text_or_missing(block.weather.as_deref()),
        rain: text_or_missing(block.rain.as_deref()),
        temperature_range: format!(
            "{} / {}",
            text_or_missing(block.min_temp.as_deref()),
            text_or_missing(block.max_temp.as_deref())
        ),
        comfort: text_or_missing(block.comfort.as_deref()),
    }
}

/// Rain tier followed by the temperature tier, separated by a space
pub fn compose_advice(block: &ForecastBlock) -> String {
    format!(
        "{} {}",
        rain_advice(block.rain.as_deref()),
        temperature_advice(block.max_temp.as_deref())
    )
}

/// Advice fragment for a rain probability; unparseable counts as 0%
pub fn rain_advice(rain: Option<&str>) -> &'static str {
    let probability = rain.and_then(leading_integer).unwrap_or(0);
    if probability >= RAIN_HEAVY_THRESHOLD {
        ADVICE_RAIN_HEAVY
    } else if probability >= RAIN_LIGHT_THRESHOLD {
        ADVICE_RAIN_LIGHT
    } else {
        ADVICE_RAIN_STABLE
    }
}

/// Advice fragment for a maximum temperature; unparseable counts as warm
///
/// A parsed 0 stays 0 and reads as cold, unlike a falsy-zero fallback that
/// would treat "0°C" as unparseable.
pub fn temperature_advice(max_temp: Option<&str>) -> &'static str {
    let max = max_temp
        .and_then(leading_integer)
        .unwrap_or(UNPARSED_MAX_TEMP);
    if max <= COLD_MAX_TEMP {
        ADVICE_TEMP_COLD
    } else if max <= COOL_MAX_TEMP {
        ADVICE_TEMP_COOL
    } else {
        ADVICE_TEMP_WARM
    }
}

/// Maximum temperature with its unit suffix removed, or [`MISSING`]
pub fn display_temperature(max_temp: Option<&str>) -> String {
    let Some(text) = max_temp else {
        return MISSING.to_string();
    };

    let mut value = text.trim();
    for suffix in ["°C", "℃", "°", "C"] {
        if let Some(stripped) = value.strip_suffix(suffix) {
            value = stripped.trim_end();
            break;
        }
    }

    if value.parse::<f64>().is_ok_and(f64::is_finite) {
        value.to_string()
    } else {
        MISSING.to_string()
    }
}

/// Date portion of a "YYYY-MM-DD hh:mm:ss" (or ISO 8601) timestamp
fn date_label(start_time: &str) -> String {
    start_time
        .split([' ', 'T'])
        .next()
        .unwrap_or_default()
        .to_string()
}

fn text_or_missing(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

/// Parses an optional sign and leading digits, ignoring whatever follows
/// ("75%" → 75, " -3°C" → -3). No digits means no value.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::get_region_by_name;

    fn block(weather: &str, min: &str, max: &str, rain: &str) -> ForecastBlock {
        ForecastBlock {
            start_time: Some("2025-01-01 06:00:00".to_string()),
            end_time: Some("2025-01-01 18:00:00".to_string()),
            weather: Some(weather.to_string()),
            min_temp: Some(min.to_string()),
            max_temp: Some(max.to_string()),
            rain: Some(rain.to_string()),
            comfort: Some("舒適".to_string()),
            wind_speed: Some("3 級".to_string()),
        }
    }

    fn record(forecasts: Vec<ForecastBlock>) -> WeatherRecord {
        WeatherRecord {
            region: get_region_by_name("臺北市").unwrap(),
            update_time: Some("2025-01-01 05:00:00".to_string()),
            forecasts,
        }
    }

    #[test]
    fn test_classify_priority_order() {
        assert_eq!(classify("晴天"), WeatherCategory::Sunny);
        assert_eq!(classify("多雲時晴"), WeatherCategory::Sunny);
        assert_eq!(classify("短暫陣雨"), WeatherCategory::Rain);
        assert_eq!(classify("多雲時陰"), WeatherCategory::Overcast);
        assert_eq!(classify("多雲"), WeatherCategory::PartlyCloudy);
        assert_eq!(classify("打雷"), WeatherCategory::Thunder);
        assert_eq!(classify("降雪"), WeatherCategory::Snow);
        assert_eq!(classify("有霧"), WeatherCategory::Fog);
        assert_eq!(classify(""), WeatherCategory::Fog);
    }

    #[test]
    fn test_thunderstorm_with_rain_resolves_to_rain() {
        assert_eq!(classify("午後雷陣雨"), WeatherCategory::Rain);
        assert_eq!(classify("午後雷陣雨").icon(), WeatherCategory::Rain.icon());
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(WeatherCategory::Sunny.icon(), "\u{2600}");
        assert_eq!(WeatherCategory::Rain.icon(), "\u{1F327}");
        assert_eq!(WeatherCategory::Overcast.icon(), "\u{2601}");
        assert_eq!(WeatherCategory::PartlyCloudy.icon(), "\u{26C5}");
        assert_eq!(WeatherCategory::Thunder.icon(), "\u{26C8}");
        assert_eq!(WeatherCategory::Snow.icon(), "\u{2744}");
        assert_eq!(WeatherCategory::Fog.icon(), "\u{1F32B}");
    }

    #[test]
    fn test_warm_dry_advice() {
        let b = block("晴", "24°C", "32°C", "10");
        assert_eq!(
            compose_advice(&b),
            format!("{} {}", ADVICE_RAIN_STABLE, ADVICE_TEMP_WARM)
        );
    }

    #[test]
    fn test_cold_wet_advice() {
        let b = block("雨", "9°C", "12°C", "75");
        assert_eq!(
            compose_advice(&b),
            format!("{} {}", ADVICE_RAIN_HEAVY, ADVICE_TEMP_COLD)
        );
    }

    #[test]
    fn test_rain_tier_boundaries() {
        assert_eq!(rain_advice(Some("60")), ADVICE_RAIN_HEAVY);
        assert_eq!(rain_advice(Some("59")), ADVICE_RAIN_LIGHT);
        assert_eq!(rain_advice(Some("30%")), ADVICE_RAIN_LIGHT);
        assert_eq!(rain_advice(Some("29")), ADVICE_RAIN_STABLE);
        assert_eq!(rain_advice(Some("--")), ADVICE_RAIN_STABLE);
        assert_eq!(rain_advice(None), ADVICE_RAIN_STABLE);
    }

    #[test]
    fn test_temperature_tier_boundaries() {
        assert_eq!(temperature_advice(Some("15°C")), ADVICE_TEMP_COLD);
        assert_eq!(temperature_advice(Some("16°C")), ADVICE_TEMP_COOL);
        assert_eq!(temperature_advice(Some("20")), ADVICE_TEMP_COOL);
        assert_eq!(temperature_advice(Some("21°C")), ADVICE_TEMP_WARM);
        assert_eq!(temperature_advice(Some("-2°C")), ADVICE_TEMP_COLD);
        assert_eq!(temperature_advice(Some("0°C")), ADVICE_TEMP_COLD);
    }

    #[test]
    fn test_unparseable_temperature_is_warm() {
        assert_eq!(temperature_advice(Some("N/A")), ADVICE_TEMP_WARM);
        assert_eq!(temperature_advice(None), ADVICE_TEMP_WARM);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("75"), Some(75));
        assert_eq!(leading_integer("75%"), Some(75));
        assert_eq!(leading_integer("  12°C"), Some(12));
        assert_eq!(leading_integer("-3°C"), Some(-3));
        assert_eq!(leading_integer("+8"), Some(8));
        assert_eq!(leading_integer("12.7"), Some(12));
        assert_eq!(leading_integer("°C"), None);
        assert_eq!(leading_integer("-"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_display_temperature_strips_unit() {
        assert_eq!(display_temperature(Some("32°C")), "32");
        assert_eq!(display_temperature(Some("25.5 ℃")), "25.5");
        assert_eq!(display_temperature(Some("-1°")), "-1");
        assert_eq!(display_temperature(Some("18")), "18");
        assert_eq!(display_temperature(Some("--")), MISSING);
        assert_eq!(display_temperature(Some("°C")), MISSING);
        assert_eq!(display_temperature(None), MISSING);
    }

    #[test]
    fn test_date_label() {
        assert_eq!(date_label("2025-01-01 06:00:00"), "2025-01-01");
        assert_eq!(date_label("2025-01-01T06:00:00+08:00"), "2025-01-01");
        assert_eq!(date_label("2025-01-01"), "2025-01-01");
    }

    #[test]
    fn test_project_full_record() {
        let vm = project(&record(vec![block("多雲時晴", "24°C", "32°C", "10")]));

        assert_eq!(vm.region_name, "臺北市");
        assert_eq!(vm.english_name, "Taipei City");
        assert_eq!(vm.update_time, "2025-01-01 05:00:00");
        assert_eq!(vm.category, Some(WeatherCategory::Sunny));
        assert_eq!(vm.icon, WeatherCategory::Sunny.icon());
        assert_eq!(vm.description, "多雲時晴");
        assert_eq!(vm.display_temperature, "32");
        assert_eq!(vm.temperature_range, "24°C — 32°C");
        assert_eq!(vm.comfort, "舒適");
        assert_eq!(vm.rain, "10");
        assert_eq!(vm.wind_speed, "3 級");
        assert_eq!(
            vm.advice,
            format!("{} {}", ADVICE_RAIN_STABLE, ADVICE_TEMP_WARM)
        );
        assert!(vm.has_current());
        assert_eq!(vm.cards.len(), 1);
    }

    #[test]
    fn test_project_empty_forecasts() {
        let vm = project(&record(Vec::new()));

        assert_eq!(vm.region_name, "臺北市");
        assert_eq!(vm.icon, MISSING);
        assert!(vm.category.is_none());
        assert!(!vm.has_current());
        for field in [
            &vm.description,
            &vm.display_temperature,
            &vm.temperature_range,
            &vm.comfort,
            &vm.rain,
            &vm.wind_speed,
            &vm.advice,
        ] {
            assert_eq!(field, MISSING);
        }
        assert!(vm.cards.is_empty());
    }

    #[test]
    fn test_project_missing_fields_in_current_block() {
        let vm = project(&record(vec![ForecastBlock::default()]));

        assert_eq!(vm.category, Some(WeatherCategory::Fog));
        assert_eq!(vm.description, MISSING);
        assert_eq!(vm.display_temperature, MISSING);
        assert_eq!(vm.temperature_range, format!("{} — {}", MISSING, MISSING));
        assert_eq!(vm.rain, MISSING);
        assert_eq!(
            vm.advice,
            format!("{} {}", ADVICE_RAIN_STABLE, ADVICE_TEMP_WARM)
        );

        let card = &vm.cards[0];
        assert_eq!(card.date_label, "");
        assert_eq!(card.icon, WeatherCategory::Fog.icon());
        assert_eq!(card.description, MISSING);
        assert_eq!(card.rain, MISSING);
        assert_eq!(card.temperature_range, format!("{} / {}", MISSING, MISSING));
        assert_eq!(card.comfort, MISSING);
    }

    #[test]
    fn test_project_caps_cards_at_three() {
        let blocks = vec![
            block("晴", "20°C", "28°C", "0"),
            block("多雲", "19°C", "26°C", "10"),
            block("陣雨", "18°C", "22°C", "70"),
            block("陰", "17°C", "21°C", "40"),
        ];
        let vm = project(&record(blocks));

        assert_eq!(vm.cards.len(), MAX_FORECAST_CARDS);
        let categories: Vec<WeatherCategory> = vm.cards.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                WeatherCategory::Sunny,
                WeatherCategory::PartlyCloudy,
                WeatherCategory::Rain
            ]
        );
        assert_eq!(vm.cards[2].date_label, "2025-01-01");
        assert_eq!(vm.cards[2].rain, "70");
        assert_eq!(vm.cards[2].temperature_range, "18°C / 22°C");
    }

    #[test]
    fn test_project_fewer_than_three_blocks() {
        let vm = project(&record(vec![
            block("晴", "20°C", "28°C", "0"),
            block("雨", "18°C", "22°C", "80"),
        ]));
        assert_eq!(vm.cards.len(), 2);
    }

    #[test]
    fn test_project_missing_update_time() {
        let mut r = record(Vec::new());
        r.update_time = None;
        assert_eq!(project(&r).update_time, MISSING);
    }
}
