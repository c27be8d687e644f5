use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{Icon, WeatherQuery},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Where weather data comes from.
///
/// Fetches return the raw JSON body; shape checks happen when the body is
/// read for display.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Current conditions for the query's city.
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<Value, WeatherError>;

    /// 5-day / 3-hour forecast for the query's city.
    async fn fetch_forecast(&self, query: &WeatherQuery) -> Result<Value, WeatherError>;

    /// The pictogram for an icon code from a current-weather body.
    async fn fetch_icon(&self, code: &str) -> Result<Icon, WeatherError>;
}
