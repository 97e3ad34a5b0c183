//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Daily aggregation of the 5-day / 3-hour forecast
//! - Failure classification into user notifications, with a bounded error log
//! - Configuration, favorites and input validation
//! - The OpenWeather provider behind the [`WeatherProvider`] trait
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod favorites;
pub mod forecast;
pub mod model;
pub mod notify;
pub mod provider;
pub mod report;
pub mod validate;

pub use config::{Config, Theme, Units};
pub use favorites::{Favorite, FavoriteError, FavoriteList};
pub use forecast::{MAX_FORECAST_DAYS, aggregate};
pub use model::{CurrentWeather, DailyForecast, WeatherSample};
pub use notify::{
    ErrorCategory, ErrorClassifier, Failure, Notification, NotificationSink, Severity, Surface,
    SurfacePreferences, dispatch,
};
pub use provider::{FetchError, MissingApiKey, WeatherProvider, provider_from_config};
pub use report::{WeatherReport, fetch_report};
pub use validate::{ValidationError, validate_city};
