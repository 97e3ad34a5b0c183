use crate::{
    Config,
    model::{CurrentWeather, WeatherSample},
    notify::{ApiFailure, Failure, NetworkFailure},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{error::Error as StdError, fmt::Debug};
use thiserror::Error;

pub mod openweather;

/// Why a provider call produced no usable data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Network error: {detail}")]
    Network { kind: NetworkFailure, detail: String },

    #[error("Request failed with status {}: {}", .0.status, truncate_body(.0.body.as_deref().unwrap_or_default()))]
    Api(ApiFailure),

    #[error("Failed to parse provider JSON: {0}")]
    Parse(String),
}

impl FetchError {
    /// The classifier input for this failure.
    pub fn to_failure(&self) -> Failure {
        match self {
            FetchError::Network { kind, detail } => {
                Failure::Network { kind: *kind, detail: detail.clone() }
            }
            FetchError::Api(api) => Failure::Api(api.clone()),
            FetchError::Parse(_) => Failure::General(self.to_string()),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let detail = error_chain(&err);
        let kind = if err.is_timeout() {
            NetworkFailure::Timeout
        } else {
            NetworkFailure::from_message(&detail)
        };
        FetchError::Network { kind, detail }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "No API key configured.\n\
     Hint: run `weather configure` or set OPENWEATHER_API_KEY."
)]
pub struct MissingApiKey;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError>;

    /// Raw 3-hour samples for the next five days.
    async fn forecast(&self, city: &str) -> Result<Vec<WeatherSample>, FetchError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, MissingApiKey> {
    let api_key = config.effective_api_key().ok_or(MissingApiKey)?;
    Ok(Box::new(OpenWeatherProvider::new(api_key, config.units)))
}

fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

pub(crate) fn truncate_body(body: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        // The environment may carry a key on developer machines.
        if cfg.effective_api_key().is_none() {
            let err = provider_from_config(&cfg).unwrap_err();
            assert!(err.to_string().contains("No API key configured"));
        }
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("0123456789abcdef".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn api_error_display_truncates_body() {
        let err = FetchError::Api(ApiFailure::new(500, Some("x".repeat(500))));
        let text = err.to_string();
        assert!(text.starts_with("Request failed with status 500: "));
        assert!(text.ends_with("..."));
        assert!(text.len() < 300);
    }

    #[test]
    fn parse_errors_classify_as_general_data_errors() {
        let err = FetchError::Parse("expected value at line 1 column 1".into());
        match err.to_failure() {
            Failure::General(text) => assert!(text.contains("JSON")),
            other => panic!("unexpected failure {other:?}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(150);
        assert!(truncate_body(&body).ends_with("..."));
    }
}
