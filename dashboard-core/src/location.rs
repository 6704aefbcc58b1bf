//! Location resolution with layered fallbacks.
//!
//! The resolver tries, in strict priority order: a previously remembered
//! location, the device's physical position (with a bounded wait), an
//! IP-based lookup, and finally two hardcoded default cities validated by
//! actually fetching weather for them. It is designed to always return
//! something renderable; [`WeatherError::Resolution`] is the total-outage
//! case only.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::{
    error::{PositionError, WeatherError},
    model::{Coordinates, Location},
    provider::WeatherProvider,
};

/// How long to wait for a device position before falling back.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period between reporting a geolocation failure and dispatching the
/// next fallback, so a caller surfacing the failure gets to show it first.
pub const FALLBACK_DELAY: Duration = Duration::from_secs(3);

const IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

/// Display name used for a device-geolocated position.
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

/// Default locations to fall back to, in order.
pub const DEFAULT_LOCATIONS: [(&str, &str, f64, f64); 2] = [
    ("Sheffield", "GB", 53.3811, -1.4701),
    ("London", "GB", 51.5074, -0.1278),
];

/// Access to the device's physical position.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Current position, bounded by `wait`. Implementations should arm their
    /// own platform timeout as well; the resolver arms an independent one and
    /// whichever fires first governs.
    async fn current_position(&self, wait: Duration) -> Result<Coordinates, PositionError>;
}

/// Position provider for environments without a geolocation capability.
#[derive(Debug, Default)]
pub struct NoPosition;

#[async_trait]
impl PositionProvider for NoPosition {
    async fn current_position(&self, _wait: Duration) -> Result<Coordinates, PositionError> {
        Err(PositionError::Unavailable)
    }
}

type ErrorSink = Box<dyn Fn(&str) + Send + Sync>;

/// Determines which location to show, via the fallback chain described in
/// the module docs.
pub struct LocationResolver {
    position: Box<dyn PositionProvider>,
    weather: Arc<dyn WeatherProvider>,
    http: Client,
    ip_lookup_url: String,
    geolocation_timeout: Duration,
    fallback_delay: Duration,
    error_sink: Option<ErrorSink>,
}

impl LocationResolver {
    pub fn new(weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            position: Box::new(NoPosition),
            weather,
            http: Client::new(),
            ip_lookup_url: IP_LOOKUP_URL.to_string(),
            geolocation_timeout: GEOLOCATION_TIMEOUT,
            fallback_delay: FALLBACK_DELAY,
            error_sink: None,
        }
    }

    pub fn with_position_provider(mut self, position: impl PositionProvider + 'static) -> Self {
        self.position = Box::new(position);
        self
    }

    /// Substitute the IP-lookup endpoint. Used by tests.
    pub fn with_ip_lookup_url(mut self, url: impl Into<String>) -> Self {
        self.ip_lookup_url = url.into();
        self
    }

    pub fn with_geolocation_timeout(mut self, wait: Duration) -> Self {
        self.geolocation_timeout = wait;
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Install a hook that receives user-facing failure messages as the
    /// chain degrades. Failures are logged either way.
    pub fn with_error_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.error_sink = Some(Box::new(sink));
        self
    }

    /// Resolve which location to use, trying each strategy in priority order.
    ///
    /// A remembered `prior` location wins outright, with no network or device
    /// access. Each later failure is reported and converted into the next
    /// fallback step; the chain is sequential, so a pending fallback can
    /// never race a location that already resolved.
    pub async fn resolve(&self, prior: Option<Location>) -> Result<Location, WeatherError> {
        if let Some(location) = prior {
            return Ok(location);
        }

        match self.device_position().await {
            Ok(coords) => {
                info!(lat = coords.lat, lon = coords.lon, "resolved device position");
                return Ok(Location {
                    name: CURRENT_LOCATION_NAME.to_string(),
                    country: String::new(),
                    lat: coords.lat,
                    lon: coords.lon,
                });
            }
            Err(err) => {
                warn!(error = %err, "device geolocation failed");
                self.report("Unable to get your location. Please enable location services.");
                // Let the caller surface the failure before the fallback fires.
                sleep(self.fallback_delay).await;
            }
        }

        match self.ip_lookup().await {
            Ok(location) => {
                info!(city = %location.name, "resolved location from IP");
                return Ok(location);
            }
            Err(err) => {
                warn!(error = %err, "IP geolocation failed, trying default locations");
            }
        }

        for (name, country, lat, lon) in DEFAULT_LOCATIONS {
            let candidate = Location {
                name: name.to_string(),
                country: country.to_string(),
                lat,
                lon,
            };

            // A default only counts if weather can actually be fetched for it.
            match self.weather.fetch_weather(candidate.coordinates()).await {
                Ok(_) => return Ok(candidate),
                Err(err) => {
                    warn!(location = %candidate.name, error = %err, "default location failed");
                    self.report(&format!("Weather for {} is unavailable.", candidate.name));
                }
            }
        }

        Err(WeatherError::Resolution)
    }

    async fn device_position(&self) -> Result<Coordinates, PositionError> {
        // The provider receives the same bound and may arm its own timer;
        // this outer one is independent and whichever fires first governs.
        match timeout(
            self.geolocation_timeout,
            self.position.current_position(self.geolocation_timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PositionError::TimedOut),
        }
    }

    async fn ip_lookup(&self) -> Result<Location, WeatherError> {
        const CONTEXT: &str = "IP geolocation";

        let res = self
            .http
            .get(&self.ip_lookup_url)
            .send()
            .await
            .map_err(|source| WeatherError::Transport { context: CONTEXT, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Transport { context: CONTEXT, source })?;

        if !status.is_success() {
            return Err(WeatherError::Upstream {
                context: CONTEXT,
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: IpLookupResponse = serde_json::from_str(&body)
            .map_err(|source| WeatherError::Parse { context: CONTEXT, source })?;

        Ok(Location {
            name: parsed.city,
            country: parsed.country,
            lat: parsed.latitude,
            lon: parsed.longitude,
        })
    }

    fn report(&self, message: &str) {
        if let Some(sink) = &self.error_sink {
            sink(message);
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    city: String,
    country: String,
    latitude: f64,
    longitude: f64,
}
