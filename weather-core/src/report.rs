//! Current conditions plus the aggregated forecast for one city.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    forecast::aggregate,
    model::{CurrentWeather, DailyForecast},
    notify::{ErrorClassifier, NetworkFailure, Notification},
    provider::{FetchError, WeatherProvider},
};

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Vec<DailyForecast>,
    /// Set when the forecast could not be shown; current conditions are still valid.
    #[serde(skip)]
    pub forecast_notice: Option<Notification>,
}

/// Fetch current weather, then the forecast.
///
/// A failed current-weather call is fatal and returns its notification. A
/// failed forecast only downgrades the report: `forecast` stays empty and
/// `forecast_notice` explains why.
pub async fn fetch_report(
    provider: &dyn WeatherProvider,
    classifier: &mut ErrorClassifier,
    city: &str,
    today: NaiveDate,
) -> Result<WeatherReport, Notification> {
    let context = format!("fetching weather for {city}");

    let current = match provider.current(city).await {
        Ok(current) => current,
        Err(err) => return Err(classifier.classify(&err.to_failure(), Some(context.as_str()))),
    };

    let (forecast, forecast_notice) = match provider.forecast(city).await {
        Ok(samples) => {
            let days = aggregate(&samples, today);
            if days.is_empty() {
                let notice =
                    classifier.forecast("No forecast data available in API response", true);
                (days, Some(notice))
            } else {
                (days, None)
            }
        }
        Err(err) => {
            let notice = classifier.forecast(&forecast_failure_context(&err, city), true);
            (Vec::new(), Some(notice))
        }
    };

    Ok(WeatherReport { current, forecast, forecast_notice })
}

fn forecast_failure_context(err: &FetchError, city: &str) -> String {
    match err {
        FetchError::Api(api) => match api.status {
            404 => format!("Forecast not available for {city}"),
            401 => "Invalid API key for forecast service".to_string(),
            status => {
                let message = api.api_message();
                if message.is_empty() {
                    format!("Forecast service error (Code: {status})")
                } else {
                    message
                }
            }
        },
        FetchError::Network { kind: NetworkFailure::Timeout, .. } => {
            "Forecast request timed out".to_string()
        }
        FetchError::Network { .. } => "Network connection error for forecast".to_string(),
        FetchError::Parse(detail) => format!("Unexpected forecast error: {detail}"),
    }
}
