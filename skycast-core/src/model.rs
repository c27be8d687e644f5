use chrono::NaiveDate;
use image::{ImageBuffer, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Cursor, str::FromStr};

use crate::error::WeatherError;

/// Unit system passed to the API as the `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// One user action's worth of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
    units: Units,
}

impl WeatherQuery {
    pub fn new(city: impl AsRef<str>, units: Units) -> Self {
        Self { city: city.as_ref().trim().to_string(), units }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_empty()
    }
}

/// A single 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Slot start, epoch seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub condition: String,
}

/// The representative slot chosen for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub temperature: f64,
    pub condition: String,
}

/// The fields of a current-weather response that get displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub icon_code: Option<String>,
}

/// A decoded condition pictogram, already scaled for display.
#[derive(Clone, PartialEq, Eq)]
pub struct Icon {
    pub code: String,
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major.
    pub rgba: Vec<u8>,
    /// The PNG as downloaded.
    pub png: Vec<u8>,
}

impl Icon {
    /// Re-encode the scaled pixels as PNG.
    pub fn scaled_png(&self) -> Result<Vec<u8>, WeatherError> {
        let buffer: RgbaImage = ImageBuffer::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| WeatherError::Icon("pixel buffer does not match size".into()))?;

        let mut out = Cursor::new(Vec::new());
        buffer
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| WeatherError::Icon(e.to_string()))?;

        Ok(out.into_inner())
    }
}

impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Icon")
            .field("code", &self.code)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .finish()
    }
}
