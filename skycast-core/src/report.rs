//! Display strings for the two result panes.

use std::fmt::Write as _;

use crate::model::{CurrentConditions, DailySummary, Units};

/// Multi-line summary of the current conditions.
pub fn current_summary(current: &CurrentConditions, units: Units) -> String {
    let temp = units.temperature_symbol();

    format!(
        "🌍 {}, {}\n\
         🌡️ Temp: {} {temp} (Feels like {} {temp})\n\
         ☁️ Condition: {}\n\
         💧 Humidity: {}%\n\
         💨 Wind: {} {}",
        current.name,
        current.country,
        current.temperature,
        current.feels_like,
        title_case(&current.condition),
        current.humidity,
        current.wind_speed,
        units.wind_speed_unit(),
    )
}

/// Header plus one line per summarised day.
pub fn forecast_summary(city: &str, days: &[DailySummary], units: Units) -> String {
    let mut text = format!("5-Day Forecast for {}:\n", title_case(city));

    for day in days {
        // Writing to a String cannot fail.
        let _ = writeln!(
            text,
            "{}: {} {}, {}",
            day.date.format("%Y-%m-%d"),
            day.temperature,
            units.temperature_symbol(),
            title_case(&day.condition),
        );
    }

    text
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
