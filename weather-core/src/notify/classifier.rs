use std::{
    fmt,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use serde::Deserialize;

use super::{ErrorCategory, ErrorLog, ErrorLogEntry, Notification, Severity};
use crate::validate::{CITY_FIELD, ValidationError};

const NETWORK_TIMEOUT: &str =
    "Connection timed out. Please check your internet connection and try again.";
const NETWORK_CONNECTION: &str =
    "Unable to connect to weather service. Please check your internet connection.";
const NETWORK_DNS: &str =
    "Cannot resolve weather service address. Please check your internet connection.";

const API_KEY_INVALID: &str = "Invalid API key. Please check your API key in settings.";
const API_CITY_NOT_FOUND: &str = "City not found. Please check the spelling and try again.";
const API_RATE_LIMIT: &str = "Too many requests. Please wait a moment before trying again.";
const API_SERVICE_UNAVAILABLE: &str =
    "Weather service is temporarily unavailable. Please try again later.";

const API_KEY_MISSING: &str = "API key is required to fetch weather data. \
     Please configure your API key in the settings.";
const CONFIG_FILE_CORRUPT: &str = "Configuration file is corrupted. Using default settings.";
const CONFIG_SAVE_FAILED: &str = "Failed to save configuration. Changes may not persist.";
const CONFIG_LOAD_FAILED: &str = "Failed to load configuration. Using default settings.";

const FORECAST_UNAVAILABLE: &str =
    "5-day forecast is temporarily unavailable, but current weather is still available.";

const CITY_NAME_EMPTY: &str = "Please enter a city name.";
const CITY_NAME_INVALID: &str =
    "Invalid city name. Please use only letters, spaces, and common punctuation.";

const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";
const DATA_PARSING_ERROR: &str = "Unable to process weather data. Please try again.";

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    Timeout,
    Dns,
    Connection,
}

impl NetworkFailure {
    /// Best-effort guess from a transport error's text.
    pub fn from_message(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("timed out") || lower.contains("timeout") {
            NetworkFailure::Timeout
        } else if lower.contains("name or service not known")
            || lower.contains("getaddrinfo failed")
            || lower.contains("dns error")
            || lower.contains("failed to lookup address")
        {
            NetworkFailure::Dns
        } else {
            NetworkFailure::Connection
        }
    }
}

/// A non-2xx response from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<serde_json::Value>,
}

impl ApiFailure {
    pub fn new(status: u16, body: Option<String>) -> Self {
        Self { status, body }
    }

    /// The provider's own explanation: the JSON `message` field, or the raw
    /// body when it is not JSON.
    pub fn api_message(&self) -> String {
        let Some(body) = self.body.as_deref() else {
            return String::new();
        };
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => match parsed.message {
                Some(serde_json::Value::String(s)) => s,
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
            Err(_) => body.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssue {
    MissingApiKey,
    FileCorrupt,
    SaveFailed,
    LoadFailed,
}

/// Every failure the application knows how to report.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Network { kind: NetworkFailure, detail: String },
    Api(ApiFailure),
    Config { issue: ConfigIssue, details: String },
    Forecast { context: String, current_weather_available: bool },
    Validation(ValidationError),
    General(String),
}

/// Classifier shared between callers on different threads.
pub type SharedClassifier = Arc<Mutex<ErrorClassifier>>;

/// Maps failures to notifications and records each one in an [`ErrorLog`].
#[derive(Debug, Default)]
pub struct ErrorClassifier {
    log: ErrorLog,
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: ErrorLog) -> Self {
        Self { log }
    }

    pub fn shared(self) -> SharedClassifier {
        Arc::new(Mutex::new(self))
    }

    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Route any [`Failure`] to its category handler.
    pub fn classify(&mut self, failure: &Failure, context: Option<&str>) -> Notification {
        match failure {
            Failure::Network { kind, detail } => self.network(*kind, detail, context),
            Failure::Api(api) => self.api(api, context),
            Failure::Config { issue, details } => self.config(*issue, details),
            Failure::Forecast { context: forecast_context, current_weather_available } => {
                self.forecast(forecast_context, *current_weather_available)
            }
            Failure::Validation(err) => self.validation(err),
            Failure::General(text) => self.general(text, context),
        }
    }

    pub fn network(
        &mut self,
        kind: NetworkFailure,
        detail: &str,
        context: Option<&str>,
    ) -> Notification {
        let base = match kind {
            NetworkFailure::Timeout => NETWORK_TIMEOUT,
            NetworkFailure::Dns => NETWORK_DNS,
            NetworkFailure::Connection => NETWORK_CONNECTION,
        };

        let notification = Notification {
            message: with_context(base.to_string(), context),
            category: ErrorCategory::Network,
            severity: Severity::Error,
            dismissible: true,
            auto_dismiss_ms: Some(8000),
        };
        self.record(&notification, detail);
        notification
    }

    pub fn api(&mut self, failure: &ApiFailure, context: Option<&str>) -> Notification {
        let (base, severity) = match failure.status {
            401 => (API_KEY_INVALID, Severity::Critical),
            404 => (API_CITY_NOT_FOUND, Severity::Warning),
            429 => (API_RATE_LIMIT, Severity::Warning),
            _ => (API_SERVICE_UNAVAILABLE, Severity::Error),
        };

        let api_message = failure.api_message();
        let mut message = base.to_string();
        if !api_message.is_empty() && !base.to_lowercase().contains(&api_message.to_lowercase()) {
            message = format!("{message} (API: {api_message})");
        }

        let notification = Notification {
            message: with_context(message, context),
            category: ErrorCategory::Api,
            severity,
            dismissible: true,
            auto_dismiss_ms: Some(if severity == Severity::Critical { 10_000 } else { 8000 }),
        };
        self.record(&notification, &format!("HTTP {}: {}", failure.status, api_message));
        notification
    }

    /// Missing API key: critical and sticky until the user configures one.
    pub fn missing_credential(&mut self) -> Notification {
        let notification = Notification {
            message: API_KEY_MISSING.to_string(),
            category: ErrorCategory::Config,
            severity: Severity::Critical,
            dismissible: false,
            auto_dismiss_ms: None,
        };
        self.record(&notification, "API key not configured");
        notification
    }

    pub fn config(&mut self, issue: ConfigIssue, details: &str) -> Notification {
        let base = match issue {
            ConfigIssue::MissingApiKey => return self.missing_credential(),
            ConfigIssue::FileCorrupt => CONFIG_FILE_CORRUPT,
            ConfigIssue::SaveFailed => CONFIG_SAVE_FAILED,
            ConfigIssue::LoadFailed => CONFIG_LOAD_FAILED,
        };

        let message = if details.is_empty() {
            base.to_string()
        } else {
            format!("{base} Details: {details}")
        };

        let notification = Notification {
            message,
            category: ErrorCategory::Config,
            severity: Severity::Warning,
            dismissible: true,
            auto_dismiss_ms: Some(8000),
        };
        self.record(&notification, details);
        notification
    }

    /// A failed forecast is only informational while current conditions are on screen.
    pub fn forecast(&mut self, context: &str, current_weather_available: bool) -> Notification {
        let (message, severity, auto_dismiss_ms) = if current_weather_available {
            (FORECAST_UNAVAILABLE.to_string(), Severity::Info, 6000)
        } else {
            (format!("Weather service error: {context}"), Severity::Error, 8000)
        };

        let notification = Notification {
            message,
            category: ErrorCategory::Forecast,
            severity,
            dismissible: true,
            auto_dismiss_ms: Some(auto_dismiss_ms),
        };
        self.record(&notification, context);
        notification
    }

    pub fn validation(&mut self, err: &ValidationError) -> Notification {
        let message = if err.field == CITY_FIELD {
            let base = if err.value.trim().is_empty() { CITY_NAME_EMPTY } else { CITY_NAME_INVALID };
            base.to_string()
        } else {
            format!("Invalid {}: {}", err.field, err.reason)
        };

        let notification = Notification {
            message,
            category: ErrorCategory::Validation,
            severity: Severity::Warning,
            dismissible: true,
            auto_dismiss_ms: Some(5000),
        };
        self.record(
            &notification,
            &format!("Field: {}, Value: {}, Reason: {}", err.field, err.value, err.reason),
        );
        notification
    }

    pub fn general(&mut self, error: &dyn fmt::Display, context: Option<&str>) -> Notification {
        let detail = error.to_string();
        let lower = detail.to_lowercase();
        let base = if lower.contains("json") || lower.contains("parsing") {
            DATA_PARSING_ERROR
        } else {
            UNEXPECTED_ERROR
        };

        let notification = Notification {
            message: with_context(base.to_string(), context),
            category: ErrorCategory::General,
            severity: Severity::Error,
            dismissible: true,
            auto_dismiss_ms: Some(8000),
        };
        self.record(&notification, &detail);
        notification
    }

    fn record(&mut self, notification: &Notification, detail: &str) {
        let entry = ErrorLogEntry {
            timestamp: Utc::now(),
            category: notification.category,
            severity: notification.severity,
            message: notification.message.clone(),
            detail: detail.to_string(),
        };

        match entry.severity {
            Severity::Critical | Severity::Error => tracing::error!(
                category = %entry.category,
                severity = %entry.severity,
                detail = %entry.detail,
                "{}",
                entry.message
            ),
            Severity::Warning => tracing::warn!(
                category = %entry.category,
                detail = %entry.detail,
                "{}",
                entry.message
            ),
            Severity::Info => tracing::info!(
                category = %entry.category,
                detail = %entry.detail,
                "{}",
                entry.message
            ),
        }

        self.log.push(entry);
    }
}

fn with_context(message: String, context: Option<&str>) -> String {
    match context.map(str::trim) {
        Some(ctx) if !ctx.is_empty() => format!("{message} (Context: {ctx})"),
        _ => message,
    }
}
