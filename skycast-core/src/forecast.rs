//! Forecast reduction: one representative 3-hour slot per calendar day.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::{
    error::{FORECAST_PARSE_MESSAGE, WeatherError},
    model::{DailySummary, ForecastEntry},
};

/// How the representative slot of a day is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Only a slot whose local `HH:MM` equals this time qualifies. Days
    /// without such a slot are left out.
    Exact(NaiveTime),
    /// The slot closest to this local time wins; earlier slot on a tie.
    NearestTo(NaiveTime),
}

impl SlotPolicy {
    pub fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
    }

    pub fn nearest_noon() -> Self {
        SlotPolicy::NearestTo(Self::noon())
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        SlotPolicy::Exact(Self::noon())
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

/// Read the slot list out of a raw forecast body.
///
/// Fails as a whole if any slot lacks a field; nothing partial is returned.
pub fn parse_entries(body: &Value) -> Result<Vec<ForecastEntry>, WeatherError> {
    let parsed = OwForecastResponse::deserialize(body).map_err(|e| {
        tracing::debug!(error = %e, "forecast body did not match");
        WeatherError::Parse(FORECAST_PARSE_MESSAGE.to_string())
    })?;

    parsed
        .list
        .into_iter()
        .map(|entry| {
            if DateTime::from_timestamp(entry.dt, 0).is_none() {
                tracing::debug!(dt = entry.dt, "forecast slot timestamp out of range");
                return Err(WeatherError::Parse(FORECAST_PARSE_MESSAGE.to_string()));
            }

            let condition = entry
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .ok_or_else(|| WeatherError::Parse(FORECAST_PARSE_MESSAGE.to_string()))?;

            Ok(ForecastEntry { timestamp: entry.dt, temperature: entry.main.temp, condition })
        })
        .collect()
}

/// Reduce with the default exact-noon policy.
pub fn reduce<Tz: TimeZone>(entries: &[ForecastEntry], tz: &Tz) -> Vec<DailySummary> {
    reduce_with(entries, tz, SlotPolicy::default())
}

/// Pick one slot per local calendar date, keeping dates in the order they
/// first appear in `entries`.
///
/// Slots with a timestamp chrono cannot represent are skipped; entries read
/// through [`parse_entries`] never have one.
pub fn reduce_with<Tz: TimeZone>(
    entries: &[ForecastEntry],
    tz: &Tz,
    policy: SlotPolicy,
) -> Vec<DailySummary> {
    let local: Vec<(&ForecastEntry, DateTime<Tz>)> = entries
        .iter()
        .filter_map(|entry| localize(entry.timestamp, tz).map(|dt| (entry, dt)))
        .collect();

    match policy {
        SlotPolicy::Exact(target) => {
            let target = (target.hour(), target.minute());
            let mut seen: HashSet<NaiveDate> = HashSet::new();

            local
                .into_iter()
                .filter(|(_, dt)| (dt.hour(), dt.minute()) == target)
                .filter(|(_, dt)| seen.insert(dt.date_naive()))
                .map(|(entry, dt)| summary(entry, dt.date_naive()))
                .collect()
        }
        SlotPolicy::NearestTo(target) => {
            let mut order: Vec<NaiveDate> = Vec::new();
            let mut best: HashMap<NaiveDate, (i64, &ForecastEntry)> = HashMap::new();

            for (entry, dt) in &local {
                let entry: &ForecastEntry = entry;
                let date = dt.date_naive();
                let distance = (dt.time() - target).num_seconds().abs();

                match best.get(&date) {
                    None => {
                        order.push(date);
                        best.insert(date, (distance, entry));
                    }
                    Some((current, _)) if distance < *current => {
                        best.insert(date, (distance, entry));
                    }
                    Some(_) => {}
                }
            }

            order
                .into_iter()
                .filter_map(|date| best.get(&date).map(|(_, entry)| summary(entry, date)))
                .collect()
        }
    }
}

fn localize<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp(ts, 0).map(|utc| utc.with_timezone(tz))
}

fn summary(entry: &ForecastEntry, date: NaiveDate) -> DailySummary {
    DailySummary { date, temperature: entry.temperature, condition: entry.condition.clone() }
}
