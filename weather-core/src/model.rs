use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the provider's `dt_txt` field.
pub const SAMPLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One 3-hour forecast observation, as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Raw `YYYY-MM-DD HH:MM:SS` text; parsed lazily so bad entries can be skipped.
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

impl WeatherSample {
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, SAMPLE_TIME_FORMAT).ok()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.recorded_at().map(|dt| dt.date())
    }
}

/// Summary of one calendar day built from its samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Short weekday, e.g. `Mon`.
    pub day_name: String,
    /// `MM/DD`.
    pub date_str: String,
    pub high: f64,
    pub low: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure_hpa: Option<u32>,
    pub observation_time: DateTime<Utc>,
}

impl CurrentWeather {
    /// `City, CC` when the provider reported a country.
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(cc) if !cc.is_empty() => format!("{}, {}", self.location_name, cc),
            _ => self.location_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: &str) -> WeatherSample {
        WeatherSample {
            timestamp: ts.to_string(),
            temperature: 1.0,
            humidity: 50,
            wind_speed: 2.0,
            description: "clear sky".into(),
            icon: "01d".into(),
        }
    }

    #[test]
    fn parses_provider_timestamp() {
        let s = sample("2024-03-05 12:00:00");
        assert_eq!(s.date(), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn bad_timestamp_has_no_date() {
        assert!(sample("yesterday noon").date().is_none());
        assert!(sample("2024-03-05").date().is_none());
    }
}
