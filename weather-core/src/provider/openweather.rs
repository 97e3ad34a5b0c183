use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Units,
    forecast::parse_forecast_payload,
    model::{CurrentWeather, WeatherSample},
    notify::ApiFailure,
};

use super::{FetchError, WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: Units) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, units, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    /// Point the provider at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// GET `path` for `city` and return the body of a 2xx response.
    async fn fetch(&self, path: &str, city: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, city, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body = %truncate_body(&body), "OpenWeather error response");
            let body = if body.is_empty() { None } else { Some(body) };
            return Err(FetchError::Api(ApiFailure::new(status.as_u16(), body)));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    #[serde(default)]
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(parsed: OwCurrentResponse) -> Self {
        let observation_time = DateTime::<Utc>::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

        let (description, icon) = match parsed.weather.into_iter().next() {
            Some(w) => (w.description, w.icon.unwrap_or_else(|| "01d".to_string())),
            None => ("Unknown".to_string(), "01d".to_string()),
        };

        CurrentWeather {
            location_name: parsed.name,
            country: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            description,
            icon,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            pressure_hpa: parsed.main.pressure,
            observation_time,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError> {
        let body = self.fetch("/data/2.5/weather", city).await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into())
    }

    async fn forecast(&self, city: &str) -> Result<Vec<WeatherSample>, FetchError> {
        let body = self.fetch("/data/2.5/forecast", city).await?;
        let samples = parse_forecast_payload(&body)?;
        tracing::debug!(count = samples.len(), "forecast samples received");
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_current_response() {
        let body = r#"{
            "name": "Oslo", "dt": 1717243200,
            "main": {"temp": 14.2, "feels_like": 13.1, "humidity": 71, "pressure": 1012},
            "weather": [{"description": "light rain", "icon": "10d"}],
            "wind": {"speed": 5.4},
            "sys": {"country": "NO"}
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).expect("valid body");
        let current = CurrentWeather::from(parsed);

        assert_eq!(current.display_name(), "Oslo, NO");
        assert_eq!(current.icon, "10d");
        assert_eq!(current.pressure_hpa, Some(1012));
        assert_eq!(current.observation_time.timestamp(), 1717243200);
    }

    #[test]
    fn current_response_without_weather_uses_defaults() {
        let body = r#"{"name": "Nowhere", "dt": 0,
            "main": {"temp": 0.0, "feels_like": 0.0, "humidity": 0}}"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).expect("valid body");
        let current = CurrentWeather::from(parsed);

        assert_eq!(current.description, "Unknown");
        assert_eq!(current.display_name(), "Nowhere");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let p = OpenWeatherProvider::new("k".into(), Units::Metric).with_base_url("http://localhost:1234/");
        assert_eq!(p.base_url, "http://localhost:1234");
    }
}
