use crate::{
    config::Config,
    error::WeatherError,
    model::{Coordinates, Location, WeatherData},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Interface over the upstream weather and geocoding service.
///
/// Implementations perform no caching and no retries: a failed fetch is
/// reported once, and a fresh call is required to try again.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions plus the multi-day forecast for `coords`,
    /// normalized into a single [`WeatherData`] aggregate.
    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherData, WeatherError>;

    /// Resolve a free-text city query to a concrete location.
    async fn find_city(&self, query: &str) -> Result<Location, WeatherError>;
}

/// Construct the provider from config.
///
/// Fails with [`WeatherError::Configuration`] when no API key is available,
/// either stored or via the environment.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let api_key = config.api_key().ok_or(WeatherError::Configuration)?;
    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(matches!(err, WeatherError::Configuration));
        assert!(err.to_string().contains("Hint: run `dashboard configure`"));
    }

    #[test]
    fn provider_from_config_works_when_key_is_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
