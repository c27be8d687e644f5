use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{WEATHER_PARSE_MESSAGE, WeatherError},
    model::CurrentConditions,
};

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    weather: Option<Vec<OwWeather>>,
    wind: OwWind,
}

/// Pull the displayed fields out of a raw current-weather body.
pub fn parse(body: &Value) -> Result<CurrentConditions, WeatherError> {
    let parsed = OwCurrentResponse::deserialize(body).map_err(|e| {
        tracing::debug!(error = %e, "current weather body did not match");
        WeatherError::Parse(WEATHER_PARSE_MESSAGE.to_string())
    })?;

    // An absent array reads as one empty condition; a present but empty one is malformed.
    let (condition, icon_code) = match parsed.weather {
        None => (None, None),
        Some(weather) => {
            let first = weather
                .into_iter()
                .next()
                .ok_or_else(|| WeatherError::Parse(WEATHER_PARSE_MESSAGE.to_string()))?;
            (first.description, first.icon)
        }
    };

    Ok(CurrentConditions {
        name: parsed.name,
        country: parsed.sys.country,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        condition: condition.unwrap_or_else(|| "N/A".to_string()),
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        icon_code: icon_code.filter(|code| !code.is_empty()),
    })
}
