//! Core library for the weather `dashboard`.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream weather provider and its data normalizer
//! - Location resolution with layered fallbacks
//! - Dashboard state, its transitions, and on-disk persistence
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{PositionError, WeatherError};
pub use location::{DEFAULT_LOCATIONS, LocationResolver, NoPosition, PositionProvider};
pub use model::{Coordinates, CurrentWeather, DailyForecast, HourlyForecast, Location, WeatherData};
pub use provider::{WeatherProvider, provider_from_config};
pub use state::{Action, DashboardState, Theme};
pub use store::{FileStore, LocationStore, ThemePreferenceSource};
