//! Daily aggregation of the provider's 3-hour forecast samples.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{DailyForecast, WeatherSample};

/// Number of future days shown to the user.
pub const MAX_FORECAST_DAYS: usize = 5;

const DEFAULT_ICON: &str = "01d";
const DEFAULT_DESCRIPTION: &str = "Unknown";

/// Group `samples` by calendar date and summarise each of the first
/// [`MAX_FORECAST_DAYS`] days strictly after `reference_date`.
///
/// Samples may come in any order. Within a day the representative
/// description/icon is the sample at `count / 2` in input order, which
/// approximates midday for a chronologically ordered feed.
pub fn aggregate(samples: &[WeatherSample], reference_date: NaiveDate) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, Vec<&WeatherSample>> = BTreeMap::new();

    for sample in samples {
        let Some(date) = sample.date() else {
            continue;
        };
        if date <= reference_date {
            continue;
        }
        days.entry(date).or_default().push(sample);
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, day)| summarise_day(date, &day))
        .collect()
}

fn summarise_day(date: NaiveDate, day: &[&WeatherSample]) -> DailyForecast {
    let temps = day.iter().map(|s| s.temperature);
    let high = temps.clone().reduce(f64::max).unwrap_or(0.0);
    let low = temps.reduce(f64::min).unwrap_or(0.0);

    let (description, icon) = match day.get(day.len() / 2) {
        Some(mid) => (mid.description.clone(), mid.icon.clone()),
        None => (DEFAULT_DESCRIPTION.to_string(), DEFAULT_ICON.to_string()),
    };

    let (humidity, wind_speed) = if day.is_empty() {
        (0, 0.0)
    } else {
        let count = day.len();
        let humidity_sum: usize = day.iter().map(|s| usize::from(s.humidity)).sum();
        let wind_sum: f64 = day.iter().map(|s| s.wind_speed).sum();
        // Mean of u8 values always fits in u8.
        ((humidity_sum / count) as u8, wind_sum / count as f64)
    };

    DailyForecast {
        date,
        day_name: date.format("%a").to_string(),
        date_str: date.format("%m/%d").to_string(),
        high,
        low,
        description,
        icon,
        humidity,
        wind_speed,
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastPayload {
    #[serde(default)]
    list: Vec<OwForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    #[serde(default)]
    dt_txt: Option<String>,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

/// Decode the `/forecast` response body into samples.
///
/// Items without `dt_txt` are dropped here; items with a malformed one are
/// kept and later skipped by [`aggregate`].
pub fn parse_forecast_payload(body: &str) -> serde_json::Result<Vec<WeatherSample>> {
    let payload: OwForecastPayload = serde_json::from_str(body)?;

    Ok(payload
        .list
        .into_iter()
        .filter_map(|item| {
            let timestamp = item.dt_txt.filter(|t| !t.is_empty())?;
            let (description, icon) = match item.weather.into_iter().next() {
                Some(w) => (w.description, w.icon.unwrap_or_else(|| DEFAULT_ICON.to_string())),
                None => (String::new(), DEFAULT_ICON.to_string()),
            };
            Some(WeatherSample {
                timestamp,
                temperature: item.main.temp,
                humidity: item.main.humidity,
                wind_speed: item.wind.speed,
                description,
                icon,
            })
        })
        .collect())
}
