use thiserror::Error;

/// Message shown when a current-weather body does not have the expected shape.
pub const WEATHER_PARSE_MESSAGE: &str = "Error parsing weather data.";

/// Message shown when a forecast body does not have the expected shape.
pub const FORECAST_PARSE_MESSAGE: &str = "Error parsing forecast data.";

/// Which request was refused because no API key is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Current,
    Forecast,
}

/// Everything that can go wrong while talking to the weather API.
///
/// None of these are fatal: the service layer turns each one into a
/// display string via [`WeatherError::user_message`].
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key was configured, so no request was made.
    #[error("{}", missing_key_message(.context))]
    MissingApiKey { context: KeyContext },

    /// Transport failure, timeout, non-2xx status or an unreadable body.
    #[error("{0}")]
    Network(String),

    /// The response did not have the shape we read from it.
    #[error("{0}")]
    Parse(String),

    /// The icon could not be downloaded or decoded.
    #[error("Icon error: {0}")]
    Icon(String),
}

impl WeatherError {
    /// The string handed to the user for this error.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_config(&self) -> bool {
        matches!(self, WeatherError::MissingApiKey { .. })
    }
}

fn missing_key_message(context: &KeyContext) -> &'static str {
    match context {
        KeyContext::Current => "API key not found. Set OPENWEATHER_API_KEY in env or .env file.",
        KeyContext::Forecast => "API key not found.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_messages_are_not_empty() {
        let current = WeatherError::MissingApiKey { context: KeyContext::Current };
        let forecast = WeatherError::MissingApiKey { context: KeyContext::Forecast };

        assert!(current.user_message().contains("OPENWEATHER_API_KEY"));
        assert_eq!(forecast.user_message(), "API key not found.");
        assert!(current.is_config());
    }

    #[test]
    fn network_and_parse_messages_pass_through() {
        let err = WeatherError::Network("404 Not Found: city not found".into());
        assert_eq!(err.user_message(), "404 Not Found: city not found");
        assert!(!err.is_config());

        let err = WeatherError::Parse(FORECAST_PARSE_MESSAGE.into());
        assert_eq!(err.user_message(), FORECAST_PARSE_MESSAGE);
    }
}
