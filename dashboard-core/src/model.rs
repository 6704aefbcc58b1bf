use serde::{Deserialize, Serialize};

/// WGS84 coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A named place weather can be fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }

    /// Stable identifier derived from the coordinates, so two favorites for
    /// the same point collapse to one entry.
    pub fn id(&self) -> String {
        format!("{}-{}", self.lat, self.lon)
    }
}

/// A favorite location as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub id: String,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Unix seconds at the time the favorite was (re)saved.
    pub last_updated: i64,
}

impl SavedLocation {
    pub fn new(location: Location, last_updated: i64) -> Self {
        Self {
            id: location.id(),
            name: location.name,
            country: location.country,
            lat: location.lat,
            lon: location.lon,
            last_updated,
        }
    }

    pub fn location(&self) -> Location {
        Location {
            name: self.name.clone(),
            country: self.country.clone(),
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// One entry of the upstream condition vocabulary, embedded in every
/// snapshot: numeric code, short category, description and icon token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Current conditions snapshot. All timestamps are Unix seconds (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_deg: u16,
    pub weather: Vec<WeatherCondition>,
    /// UV index; 0 when the upstream tier does not report one.
    pub uvi: f64,
    pub pressure: u32,
    /// Visibility in metres, passed through unmodified.
    pub visibility: u32,
    /// Cloud cover percentage, passed through unmodified.
    pub clouds: u8,
    /// Derived, not reported upstream: `temp - (100 - humidity) / 5`.
    pub dew_point: f64,
    pub sunrise: i64,
    pub sunset: i64,
}

/// One 3-hour slot of the next-24-hours sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_deg: u16,
    pub weather: Vec<WeatherCondition>,
    /// Precipitation probability in `[0, 1]`; exactly 0 when absent upstream.
    pub pop: f64,
    /// Rain volume over the 3-hour interval in mm, when reported.
    pub rain: Option<f64>,
}

/// Per-slot temperatures of a forecast day. The free tier has no true daily
/// aggregate, so every slot carries the same single 3-hour reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTemperatures {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayFeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One calendar day of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub dt: i64,
    pub temp: DayTemperatures,
    pub feels_like: DayFeelsLike,
    pub pressure: u32,
    pub humidity: u8,
    pub weather: Vec<WeatherCondition>,
    pub wind_speed: f64,
    pub wind_deg: u16,
    pub clouds: u8,
    pub pop: f64,
    /// 3-hour rain accumulation in mm, when reported.
    pub rain: Option<f64>,
    /// Always 0: UV index is not available in the free-tier forecast.
    pub uvi: f64,
}

/// Alert severity, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub event: String,
    pub severity: AlertSeverity,
    pub description: String,
    pub start: i64,
    pub end: i64,
}

/// The aggregate handed to the presentation layer: current snapshot, the
/// next-24-hours hourly sequence (always 8 entries) and the 5-entry daily
/// sequence, plus timezone metadata and any active alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub timezone: String,
    pub timezone_offset: i32,
    pub alerts: Option<Vec<WeatherAlert>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheffield() -> Location {
        Location {
            name: "Sheffield".to_string(),
            country: "GB".to_string(),
            lat: 53.3811,
            lon: -1.4701,
        }
    }

    #[test]
    fn location_id_concatenates_coordinates() {
        assert_eq!(sheffield().id(), "53.3811--1.4701");
    }

    #[test]
    fn identical_coordinates_share_an_id() {
        let mut other = sheffield();
        other.name = "Somewhere else".to_string();
        assert_eq!(sheffield().id(), other.id());
    }

    #[test]
    fn severity_is_ordered() {
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::Medium < AlertSeverity::High);
    }

    #[test]
    fn saved_location_round_trips() {
        let saved = SavedLocation::new(sheffield(), 1_700_000_000);
        assert_eq!(saved.id, "53.3811--1.4701");
        assert_eq!(saved.location(), sheffield());
    }
}
