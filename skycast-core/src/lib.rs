//! Core library for the `skycast` weather client.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - The OpenWeather HTTP client behind the [`WeatherSource`] trait
//! - Forecast reduction (one representative slot per day)
//! - Display formatting and the two user actions in [`WeatherService`]
//!
//! It is used by `skycast-cli`, but the service only needs a [`ResultSink`],
//! so other front ends can drive it too.

pub mod config;
pub mod current;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod report;
pub mod service;

pub use config::{ClientConfig, Config};
pub use error::WeatherError;
pub use forecast::SlotPolicy;
pub use model::{CurrentConditions, DailySummary, ForecastEntry, Icon, Units, WeatherQuery};
pub use provider::{OpenWeatherClient, WeatherSource};
pub use service::{ResultSink, WeatherService};
