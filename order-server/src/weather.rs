//! Weather snapshot attached to every unit order
//!
//! The forecast service itself lives outside this crate; the checkout only
//! needs a [`WeatherProvider`]. When none is configured the fixed fallback
//! `sunny` / `25.0` is recorded.

use shared::order::WeatherStatus;

pub const FALLBACK_STATUS: WeatherStatus = WeatherStatus::Sunny;
pub const FALLBACK_TEMPERATURE: f64 = 25.0;

/// Weather at checkout time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub status: WeatherStatus,
    /// Celsius
    pub temperature: f64,
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self {
            status: FALLBACK_STATUS,
            temperature: FALLBACK_TEMPERATURE,
        }
    }
}

pub trait WeatherProvider: Send + Sync {
    fn current(&self) -> WeatherReading;
}

/// Always returns the fallback constants
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackWeather;

impl WeatherProvider for FallbackWeather {
    fn current(&self) -> WeatherReading {
        WeatherReading::default()
    }
}

/// Fixed reading from configuration
#[derive(Debug, Clone, Copy)]
pub struct StaticWeather(pub WeatherReading);

impl WeatherProvider for StaticWeather {
    fn current(&self) -> WeatherReading {
        self.0
    }
}

const SUNNY: &[&str] = &["晴", "多雲時晴", "晴時多雲"];

const CLOUDY: &[&str] = &[
    "多雲",
    "多雲時陰",
    "陰",
    "陰時多雲",
    "陰時多雲有短暫雨",
    "多雲時陰有短暫雨",
    "短暫陣雨",
    "霾",
    "多雲有霾",
    "陰有霾",
    "陰有霧",
    "霧",
    "多雲有霧",
];

const RAINY: &[&str] = &["短暫雨", "多雲時晴有短暫雨", "雨", "陣雨", "雷雨", "雷陣雨"];

const STORMY: &[&str] = &[
    "多雲有雷陣雨",
    "陰有雷陣雨",
    "雷陣雨伴有冰雹",
    "多雲有雷陣雨伴冰雹",
    "陰有雷陣雨伴冰雹",
    "雪",
    "多雲有雪",
    "陰有雪",
    "雨夾雪",
    "多雲有雨夾雪",
    "陰有雨夾雪",
];

/// Map a forecast description (中央氣象署 wording) to a weather status
///
/// Returns `None` for descriptions outside the table.
pub fn classify_weather(description: &str) -> Option<WeatherStatus> {
    let description = description.trim();
    if let Some(status) = WeatherStatus::from_code(&description.to_lowercase()) {
        return Some(status);
    }
    [
        (SUNNY, WeatherStatus::Sunny),
        (CLOUDY, WeatherStatus::Cloudy),
        (RAINY, WeatherStatus::Rainy),
        (STORMY, WeatherStatus::Stormy),
    ]
    .into_iter()
    .find(|(table, _)| table.contains(&description))
    .map(|(_, status)| status)
}
