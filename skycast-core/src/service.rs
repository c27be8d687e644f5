//! The two user actions: show current weather, show the forecast.
//!
//! Results and errors both end up as display strings in a [`ResultSink`];
//! nothing is returned to the caller and nothing panics.

use chrono::TimeZone;
use tracing::{debug, info};

use crate::{
    current,
    error::WeatherError,
    forecast::{self, SlotPolicy},
    model::{DailySummary, Icon, Units, WeatherQuery},
    provider::WeatherSource,
    report,
};

/// Shown when the city field is empty.
pub const EMPTY_CITY_MESSAGE: &str = "Enter a city name!";

/// Receives what the user should see.
pub trait ResultSink {
    /// Replace the current-weather text.
    fn show_current(&mut self, text: &str);

    /// Replace the icon; `None` clears it.
    fn show_icon(&mut self, icon: Option<&Icon>);

    /// Replace the forecast text.
    fn show_forecast(&mut self, text: &str);
}

#[derive(Debug)]
pub struct WeatherService<S, Tz: TimeZone> {
    source: S,
    units: Units,
    tz: Tz,
    policy: SlotPolicy,
}

impl<S, Tz> WeatherService<S, Tz>
where
    S: WeatherSource,
    Tz: TimeZone,
{
    /// `tz` decides which calendar day and time of day each forecast slot falls on.
    pub fn new(source: S, units: Units, tz: Tz) -> Self {
        Self { source, units, tz, policy: SlotPolicy::default() }
    }

    pub fn with_policy(mut self, policy: SlotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn show_weather(&self, city: &str, sink: &mut dyn ResultSink) {
        let query = WeatherQuery::new(city, self.units);
        if query.is_empty() {
            sink.show_current(EMPTY_CITY_MESSAGE);
            sink.show_icon(None);
            return;
        }

        let conditions = match self.source.fetch_current(&query).await {
            Ok(body) => current::parse(&body),
            Err(e) => Err(e),
        };

        let conditions = match conditions {
            Ok(c) => c,
            Err(e) => {
                debug!(city = query.city(), error = %e, "current weather unavailable");
                sink.show_current(&e.user_message());
                sink.show_icon(None);
                return;
            }
        };

        sink.show_current(&report::current_summary(&conditions, self.units));
        info!(city = query.city(), "current weather shown");

        match conditions.icon_code.as_deref() {
            Some(code) => match self.source.fetch_icon(code).await {
                Ok(icon) => sink.show_icon(Some(&icon)),
                Err(e) => {
                    debug!(code, error = %e, "icon unavailable");
                    sink.show_icon(None);
                }
            },
            None => sink.show_icon(None),
        }
    }

    pub async fn show_forecast(&self, city: &str, sink: &mut dyn ResultSink) {
        let query = WeatherQuery::new(city, self.units);
        if query.is_empty() {
            sink.show_forecast(EMPTY_CITY_MESSAGE);
            return;
        }

        match self.daily_summaries(&query).await {
            Ok(days) => {
                sink.show_forecast(&report::forecast_summary(query.city(), &days, self.units));
                info!(city = query.city(), days = days.len(), "forecast shown");
            }
            Err(e) => {
                debug!(city = query.city(), error = %e, "forecast unavailable");
                sink.show_forecast(&e.user_message());
            }
        }
    }

    /// Fetch, parse and reduce the forecast for `query`.
    pub async fn daily_summaries(
        &self,
        query: &WeatherQuery,
    ) -> Result<Vec<DailySummary>, WeatherError> {
        let body = self.source.fetch_forecast(query).await?;
        let entries = forecast::parse_entries(&body)?;
        Ok(forecast::reduce_with(&entries, &self.tz, self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FORECAST_PARSE_MESSAGE, KeyContext, WEATHER_PARSE_MESSAGE};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{Value, json};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct Recorder {
        current: Vec<String>,
        icons: Vec<Option<String>>,
        forecast: Vec<String>,
    }

    impl ResultSink for Recorder {
        fn show_current(&mut self, text: &str) {
            self.current.push(text.to_string());
        }

        fn show_icon(&mut self, icon: Option<&Icon>) {
            self.icons.push(icon.map(|i| i.code.clone()));
        }

        fn show_forecast(&mut self, text: &str) {
            self.forecast.push(text.to_string());
        }
    }

    /// Canned responses; counts every call.
    #[derive(Debug, Default)]
    struct FakeSource {
        current: Option<Value>,
        forecast: Option<Value>,
        icon_fails: bool,
        calls: AtomicUsize,
        icon_codes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn fetch_current(&self, _query: &WeatherQuery) -> Result<Value, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.current
                .clone()
                .ok_or(WeatherError::MissingApiKey { context: KeyContext::Current })
        }

        async fn fetch_forecast(&self, _query: &WeatherQuery) -> Result<Value, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.forecast.clone().ok_or_else(|| WeatherError::Network("timed out".into()))
        }

        async fn fetch_icon(&self, code: &str) -> Result<Icon, WeatherError> {
            self.icon_codes.lock().unwrap().push(code.to_string());
            if self.icon_fails {
                return Err(WeatherError::Icon("bad png".into()));
            }
            Ok(Icon { code: code.to_string(), width: 1, height: 1, rgba: vec![0; 4], png: vec![] })
        }
    }

    fn london_current() -> Value {
        json!({
            "weather": [{ "description": "clear sky", "icon": "01d" }],
            "main": { "temp": 15.2, "feels_like": 14.8, "humidity": 60 },
            "wind": { "speed": 3.1 },
            "sys": { "country": "GB" },
            "name": "London"
        })
    }

    fn service(source: FakeSource) -> WeatherService<FakeSource, Utc> {
        WeatherService::new(source, Units::Metric, Utc)
    }

    #[tokio::test]
    async fn empty_city_makes_no_request() {
        let svc = service(FakeSource::default());
        let mut sink = Recorder::default();

        svc.show_weather("   ", &mut sink).await;
        svc.show_forecast("", &mut sink).await;

        assert_eq!(sink.current, vec![EMPTY_CITY_MESSAGE]);
        assert_eq!(sink.forecast, vec![EMPTY_CITY_MESSAGE]);
        assert_eq!(sink.icons, vec![None]);
        assert_eq!(svc.source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_error_is_shown_and_icon_cleared() {
        let svc = service(FakeSource::default());
        let mut sink = Recorder::default();

        svc.show_weather("London", &mut sink).await;

        assert_eq!(sink.current.len(), 1);
        assert!(sink.current[0].contains("API key not found"));
        assert_eq!(sink.icons, vec![None]);
    }

    #[tokio::test]
    async fn malformed_current_body_shows_parse_message() {
        let svc = service(FakeSource { current: Some(json!({"cod": 200})), ..Default::default() });
        let mut sink = Recorder::default();

        svc.show_weather("London", &mut sink).await;

        assert_eq!(sink.current, vec![WEATHER_PARSE_MESSAGE]);
        assert_eq!(sink.icons, vec![None]);
        assert!(svc.source().icon_codes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn current_weather_fetches_icon_once() {
        let svc = service(FakeSource { current: Some(london_current()), ..Default::default() });
        let mut sink = Recorder::default();

        svc.show_weather("London", &mut sink).await;

        let text = &sink.current[0];
        for needle in ["London", "15.2", "14.8", "Clear Sky", "60", "3.1"] {
            assert!(text.contains(needle), "missing {needle:?} in {text}");
        }
        assert_eq!(*svc.source().icon_codes.lock().unwrap(), vec!["01d".to_string()]);
        assert_eq!(sink.icons, vec![Some("01d".to_string())]);
    }

    #[tokio::test]
    async fn icon_failure_keeps_text() {
        let svc = service(FakeSource {
            current: Some(london_current()),
            icon_fails: true,
            ..Default::default()
        });
        let mut sink = Recorder::default();

        svc.show_weather("London", &mut sink).await;

        assert!(sink.current[0].contains("London, GB"));
        assert_eq!(sink.icons, vec![None]);
    }

    #[tokio::test]
    async fn forecast_network_error_is_shown() {
        let svc = service(FakeSource::default());
        let mut sink = Recorder::default();

        svc.show_forecast("London", &mut sink).await;

        assert_eq!(sink.forecast, vec!["timed out"]);
    }

    #[tokio::test]
    async fn forecast_parse_error_is_generic() {
        let body = json!({ "list": [{ "dt": 1714564800 }] });
        let svc = service(FakeSource { forecast: Some(body), ..Default::default() });
        let mut sink = Recorder::default();

        svc.show_forecast("London", &mut sink).await;

        assert_eq!(sink.forecast, vec![FORECAST_PARSE_MESSAGE]);
    }

    #[tokio::test]
    async fn forecast_is_reduced_and_formatted() {
        // 2024-05-01 12:00 UTC and 15:00 UTC, then 2024-05-02 12:00 UTC.
        let body = json!({ "list": [
            { "dt": 1714564800, "main": { "temp": 15.2 }, "weather": [{ "description": "clear sky" }] },
            { "dt": 1714575600, "main": { "temp": 17.0 }, "weather": [{ "description": "few clouds" }] },
            { "dt": 1714651200, "main": { "temp": 13.4 }, "weather": [{ "description": "light rain" }] }
        ]});
        let svc = service(FakeSource { forecast: Some(body), ..Default::default() });
        let mut sink = Recorder::default();

        svc.show_forecast("london", &mut sink).await;

        assert_eq!(
            sink.forecast,
            vec![
                "5-Day Forecast for London:\n\
                 2024-05-01: 15.2 °C, Clear Sky\n\
                 2024-05-02: 13.4 °C, Light Rain\n"
            ]
        );
    }

    #[tokio::test]
    async fn nearest_policy_is_opt_in() {
        // 2024-05-01 13:00 UTC only.
        let body = json!({ "list": [
            { "dt": 1714568400, "main": { "temp": 9.0 }, "weather": [{ "description": "mist" }] }
        ]});
        let query = WeatherQuery::new("London", Units::Metric);

        let exact = service(FakeSource { forecast: Some(body.clone()), ..Default::default() });
        assert!(exact.daily_summaries(&query).await.unwrap().is_empty());

        let nearest = service(FakeSource { forecast: Some(body), ..Default::default() })
            .with_policy(SlotPolicy::nearest_noon());
        assert_eq!(nearest.daily_summaries(&query).await.unwrap().len(), 1);
    }
}
