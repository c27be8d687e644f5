use async_trait::async_trait;
use image::{ImageFormat, imageops::FilterType};
use reqwest::Client;
use serde_json::Value;
use std::{fmt, time::Duration};
use tracing::{debug, instrument};

use crate::{
    config::ClientConfig,
    error::{KeyContext, WeatherError},
    model::{Icon, WeatherQuery},
};

use super::WeatherSource;

/// Icons are scaled to this square size before display.
pub const ICON_SIZE: u32 = 100;

#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    http: Client,
    config: ClientConfig,
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("config", &self.config)
            .finish()
    }
}

impl OpenWeatherClient {
    /// Build a client. A missing key is not an error here: every data fetch
    /// reports it instead, so the caller can still start up.
    pub fn new(api_key: Option<String>, config: ClientConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());

        Ok(Self { api_key, http, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn icon_url(&self, code: &str) -> String {
        format!("{}/img/wn/{code}@2x.png", self.config.icon_base_url.trim_end_matches('/'))
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get_json(
        &self,
        name: &str,
        what: &str,
        query: &WeatherQuery,
        context: KeyContext,
    ) -> Result<Value, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey { context })?;
        let url = self.endpoint(name);

        debug!(url = %url, "requesting OpenWeather {what}");

        let res = self
            .http
            .get(&url)
            .query(&[("q", query.city()), ("appid", api_key), ("units", query.units().as_str())])
            .send()
            .await
            .map_err(|e| {
                let message = without_api_key(&e.to_string(), api_key);
                debug!(error = %message, "OpenWeather {what} request failed");
                WeatherError::Network(message)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            let message = without_api_key(&e.to_string(), api_key);
            WeatherError::Network(format!(
                "Failed to read OpenWeather {what} response body: {message}"
            ))
        })?;

        if !status.is_success() {
            debug!(%status, "OpenWeather {what} request returned an error status");
            return Err(WeatherError::Network(format!(
                "OpenWeather {what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Network(format!("Failed to decode OpenWeather {what} response: {e}"))
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self), fields(city = %query.city(), units = %query.units()))]
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        self.get_json("weather", "current weather", query, KeyContext::Current).await
    }

    #[instrument(skip(self), fields(city = %query.city(), units = %query.units()))]
    async fn fetch_forecast(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        self.get_json("forecast", "forecast", query, KeyContext::Forecast).await
    }

    #[instrument(skip(self))]
    async fn fetch_icon(&self, code: &str) -> Result<Icon, WeatherError> {
        let url = self.icon_url(code);
        debug!(url = %url, "requesting condition icon");

        let png = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| WeatherError::Network(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?
            .to_vec();

        decode_icon(code, png)
    }
}

/// Decode a PNG icon and scale it to [`ICON_SIZE`] square.
pub fn decode_icon(code: &str, png: Vec<u8>) -> Result<Icon, WeatherError> {
    let img = image::load_from_memory_with_format(&png, ImageFormat::Png)
        .map_err(|e| WeatherError::Icon(e.to_string()))?
        .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Triangle)
        .to_rgba8();

    let (width, height) = img.dimensions();

    Ok(Icon { code: code.to_string(), width, height, rgba: img.into_raw(), png })
}

// reqwest errors include the request URL, which carries `appid`.
fn without_api_key(message: &str, api_key: &str) -> String {
    message.replace(api_key, "***")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
