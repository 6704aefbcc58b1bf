use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{
        Coordinates, CurrentWeather, DailyForecast, DayFeelsLike, DayTemperatures, HourlyForecast,
        Location, WeatherCondition, WeatherData,
    },
};

use super::WeatherProvider;

const API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const GEO_BASE: &str = "https://api.openweathermap.org/geo/1.0";

/// Forecast entries covering the next 24 hours (one every 3 hours).
const HOURLY_ENTRIES: usize = 8;
/// Entries per calendar day: every 8th 3-hour reading is 24 hours apart.
const DAILY_STRIDE: usize = 8;
/// Days covered by the free-tier forecast.
const DAILY_ENTRIES: usize = 5;

/// Client for OpenWeather's free-tier current-conditions, 5-day/3-hour
/// forecast and geocoding endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    api_base: String,
    geo_base: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            api_base: API_BASE.to_string(),
            geo_base: GEO_BASE.to_string(),
        }
    }

    /// Point the provider at different base URLs. Used by tests to substitute
    /// a mock server for the real endpoints.
    pub fn with_base_urls(mut self, api_base: impl Into<String>, geo_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.geo_base = geo_base.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        context: &'static str,
    ) -> Result<T, WeatherError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| WeatherError::Transport { context, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Transport { context, source })?;

        if !status.is_success() {
            return Err(WeatherError::Upstream {
                context,
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { context, source })
    }

    fn coordinate_query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherData, WeatherError> {
        let current_url = format!("{}/weather", self.api_base);
        let forecast_url = format!("{}/forecast", self.api_base);
        let query = self.coordinate_query(coords);

        // The two requests are independent; issue them together. Both must
        // succeed before anything is produced, so the first failure aborts.
        let (current, forecast) = tokio::try_join!(
            self.get_json::<OwCurrentResponse>(&current_url, &query, "OpenWeather current"),
            self.get_json::<OwForecastResponse>(&forecast_url, &query, "OpenWeather forecast"),
        )?;

        debug!(
            lat = coords.lat,
            lon = coords.lon,
            entries = forecast.list.len(),
            "fetched weather data"
        );

        Ok(normalize(current, forecast))
    }

    async fn find_city(&self, query: &str) -> Result<Location, WeatherError> {
        let url = format!("{}/direct", self.geo_base);
        let params = vec![
            ("q", query.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        let candidates: Vec<OwGeoEntry> =
            self.get_json(&url, &params, "OpenWeather geocoding").await?;

        let hit = candidates
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::CityNotFound(query.to_string()))?;

        Ok(Location {
            name: hit.name,
            country: hit.country.unwrap_or_default(),
            lat: hit.lat,
            lon: hit.lon,
        })
    }
}

// Raw payload shapes, deserialized verbatim before normalization.

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    sys: OwSys,
    #[serde(default)]
    visibility: u32,
    /// Not reported by this tier; kept optional in case the field appears.
    uvi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    #[serde(default)]
    pop: f64,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    country: Option<String>,
    lat: f64,
    lon: f64,
}

/// Reshape the two raw responses into the uniform aggregate.
fn normalize(current: OwCurrentResponse, forecast: OwForecastResponse) -> WeatherData {
    WeatherData {
        current: current_snapshot(current),
        hourly: hourly_sequence(&forecast.list),
        daily: daily_sequence(&forecast.list),
        // The free tier exposes no timezone metadata.
        timezone: "UTC".to_string(),
        timezone_offset: 0,
        alerts: None,
    }
}

fn current_snapshot(raw: OwCurrentResponse) -> CurrentWeather {
    let temp = raw.main.temp;
    let humidity = raw.main.humidity;

    CurrentWeather {
        temp,
        feels_like: raw.main.feels_like,
        humidity,
        wind_speed: raw.wind.speed,
        wind_deg: raw.wind.deg,
        weather: conditions(raw.weather),
        uvi: raw.uvi.unwrap_or(0.0),
        pressure: raw.main.pressure,
        visibility: raw.visibility,
        clouds: raw.clouds.all,
        dew_point: dew_point(temp, humidity),
        sunrise: raw.sys.sunrise,
        sunset: raw.sys.sunset,
    }
}

/// Approximate dew point; the free tier does not report one.
fn dew_point(temp: f64, humidity: u8) -> f64 {
    temp - (100.0 - f64::from(humidity)) / 5.0
}

/// First 8 forecast entries, mapped field by field.
fn hourly_sequence(list: &[OwForecastEntry]) -> Vec<HourlyForecast> {
    list.iter()
        .take(HOURLY_ENTRIES)
        .map(|entry| HourlyForecast {
            dt: entry.dt,
            temp: entry.main.temp,
            feels_like: entry.main.feels_like,
            humidity: entry.main.humidity,
            wind_speed: entry.wind.speed,
            wind_deg: entry.wind.deg,
            weather: conditions_ref(&entry.weather),
            pop: entry.pop,
            rain: entry.rain.as_ref().and_then(|rain| rain.three_hour),
        })
        .collect()
}

/// Every 8th entry (indices 0, 8, 16, 24, 32), one per calendar day. The
/// single 3-hour reading fans out to every time-of-day slot: the source has
/// no finer granularity at this tier.
fn daily_sequence(list: &[OwForecastEntry]) -> Vec<DailyForecast> {
    list.iter()
        .step_by(DAILY_STRIDE)
        .take(DAILY_ENTRIES)
        .map(|entry| DailyForecast {
            dt: entry.dt,
            temp: DayTemperatures {
                day: entry.main.temp,
                min: entry.main.temp_min,
                max: entry.main.temp_max,
                night: entry.main.temp,
                eve: entry.main.temp,
                morn: entry.main.temp,
            },
            feels_like: DayFeelsLike {
                day: entry.main.feels_like,
                night: entry.main.feels_like,
                eve: entry.main.feels_like,
                morn: entry.main.feels_like,
            },
            pressure: entry.main.pressure,
            humidity: entry.main.humidity,
            weather: conditions_ref(&entry.weather),
            wind_speed: entry.wind.speed,
            wind_deg: entry.wind.deg,
            clouds: entry.clouds.all,
            pop: entry.pop,
            rain: entry.rain.as_ref().and_then(|rain| rain.three_hour),
            // UV index is not available in the free-tier forecast.
            uvi: 0.0,
        })
        .collect()
}

fn conditions(raw: Vec<OwWeather>) -> Vec<WeatherCondition> {
    raw.into_iter()
        .map(|w| WeatherCondition { id: w.id, main: w.main, description: w.description, icon: w.icon })
        .collect()
}

fn conditions_ref(raw: &[OwWeather]) -> Vec<WeatherCondition> {
    raw.iter()
        .map(|w| WeatherCondition {
            id: w.id,
            main: w.main.clone(),
            description: w.description.clone(),
            icon: w.icon.clone(),
        })
        .collect()
}

/// Pull the upstream `message` field out of an error body when present,
/// otherwise fall back to the (truncated) body itself.
fn upstream_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OwErrorBody {
        message: Option<String>,
    }

    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(OwErrorBody { message: Some(message) }) if !message.is_empty() => message,
        _ => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize) -> OwForecastEntry {
        OwForecastEntry {
            dt: 1_700_000_000 + (index as i64) * 10_800,
            main: OwMain {
                temp: 10.0 + index as f64,
                feels_like: 9.0 + index as f64,
                temp_min: 8.0 + index as f64,
                temp_max: 12.0 + index as f64,
                pressure: 1012,
                humidity: 70,
            },
            weather: vec![OwWeather {
                id: 500,
                main: "Rain".to_string(),
                description: "light rain".to_string(),
                icon: "10d".to_string(),
            }],
            wind: OwWind { speed: 4.2, deg: 200 },
            clouds: OwClouds { all: 80 },
            pop: 0.4,
            rain: None,
        }
    }

    fn forecast_list(len: usize) -> Vec<OwForecastEntry> {
        (0..len).map(entry).collect()
    }

    #[test]
    fn hourly_takes_first_eight_in_order() {
        let list = forecast_list(40);
        let hourly = hourly_sequence(&list);

        assert_eq!(hourly.len(), 8);
        for (i, slot) in hourly.iter().enumerate() {
            assert_eq!(slot.dt, list[i].dt);
        }
        assert!(hourly.windows(2).all(|pair| pair[0].dt <= pair[1].dt));
    }

    #[test]
    fn daily_takes_every_eighth_entry() {
        let list = forecast_list(40);
        let daily = daily_sequence(&list);

        assert_eq!(daily.len(), 5);
        for (i, day) in daily.iter().enumerate() {
            assert_eq!(day.dt, list[i * 8].dt);
        }
    }

    #[test]
    fn daily_fans_single_reading_into_every_slot() {
        let list = forecast_list(40);
        let day = &daily_sequence(&list)[1];
        let source = &list[8];

        assert_eq!(day.temp.day, source.main.temp);
        assert_eq!(day.temp.night, source.main.temp);
        assert_eq!(day.temp.eve, source.main.temp);
        assert_eq!(day.temp.morn, source.main.temp);
        assert_eq!(day.temp.min, source.main.temp_min);
        assert_eq!(day.temp.max, source.main.temp_max);
        assert_eq!(day.feels_like.day, source.main.feels_like);
        assert_eq!(day.feels_like.night, source.main.feels_like);
    }

    #[test]
    fn daily_uv_index_is_always_zero() {
        let daily = daily_sequence(&forecast_list(40));
        assert!(daily.iter().all(|day| day.uvi == 0.0));
    }

    #[test]
    fn rain_volume_comes_from_three_hour_accumulation() {
        let mut list = forecast_list(16);
        list[0].rain = Some(OwRain { three_hour: Some(1.5) });
        list[8].rain = Some(OwRain { three_hour: None });

        let hourly = hourly_sequence(&list);
        assert_eq!(hourly[0].rain, Some(1.5));
        assert_eq!(hourly[1].rain, None);

        let daily = daily_sequence(&list);
        assert_eq!(daily[0].rain, Some(1.5));
        assert_eq!(daily[1].rain, None);
    }

    #[test]
    fn dew_point_matches_approximation() {
        assert_eq!(dew_point(20.0, 100), 20.0);
        assert_eq!(dew_point(15.0, 50), 5.0);
        assert_eq!(dew_point(0.0, 80), -4.0);
    }

    #[test]
    fn missing_pop_defaults_to_zero() {
        let raw = r#"{
            "dt": 1700000000,
            "main": {"temp": 10.0, "feels_like": 9.0, "temp_min": 8.0, "temp_max": 12.0, "pressure": 1012, "humidity": 70},
            "weather": [],
            "wind": {"speed": 3.0, "deg": 120},
            "clouds": {"all": 10}
        }"#;
        let parsed: OwForecastEntry = serde_json::from_str(raw).expect("entry should parse");
        assert_eq!(parsed.pop, 0.0);
        assert!(parsed.rain.is_none());
    }

    #[test]
    fn upstream_message_prefers_message_field() {
        assert_eq!(
            upstream_message(r#"{"cod":401, "message":"Invalid API key"}"#),
            "Invalid API key"
        );
        assert_eq!(upstream_message("plain text error"), "plain text error");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(300);
        let message = upstream_message(&body);
        assert!(message.len() < 300);
        assert!(message.ends_with("..."));
    }
}
