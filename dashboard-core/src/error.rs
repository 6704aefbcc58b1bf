use thiserror::Error;

/// Errors produced by the weather pipeline.
///
/// `Upstream`, `Transport` and `Parse` all surface to the user as-is; none
/// of them triggers an automatic retry. `Configuration` is fatal until the
/// user configures a credential. `Resolution` only occurs when every
/// location fallback, including both hardcoded defaults, has failed.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "weather API key is not configured.\n\
         Hint: run `dashboard configure` or set the OPENWEATHER_API_KEY environment variable."
    )]
    Configuration,

    /// Upstream answered with a non-success status.
    #[error("{context} request failed with status {status}: {message}")]
    Upstream {
        context: &'static str,
        status: u16,
        message: String,
    },

    /// The request never produced a usable response.
    #[error("{context} request failed: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {context} response: {source}")]
    Parse {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no location found for '{0}'")]
    CityNotFound(String),

    #[error("unable to resolve a usable location: every fallback failed")]
    Resolution,
}

/// Failures reported by a device position lookup.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable on this device")]
    Unavailable,

    #[error("position request timed out")]
    TimedOut,
}
