//! User-facing notifications produced from failures.
//!
//! The [`ErrorClassifier`] turns a [`Failure`] into a [`Notification`];
//! [`SurfacePreferences`] decides where it is shown and [`dispatch`] hands it
//! to whichever sinks the caller passes in.

use std::fmt;

use serde::Serialize;

pub mod classifier;
pub mod error_log;

pub use classifier::{
    ApiFailure, ConfigIssue, ErrorClassifier, Failure, NetworkFailure, SharedClassifier,
};
pub use error_log::{ERROR_LOG_CAPACITY, ErrorLog, ErrorLogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Network,
    Api,
    Config,
    Validation,
    Forecast,
    General,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Api => "api",
            ErrorCategory::Config => "config",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Forecast => "forecast",
            ErrorCategory::General => "general",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered urgency: `Info < Warning < Error < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Heading used when the notification is shown as a dialog.
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Info => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub dismissible: bool,
    pub auto_dismiss_ms: Option<u64>,
}

/// Where a notification is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Dialog,
    Banner,
    Toast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePreferences {
    pub toast_for_info: bool,
    pub banner_for_errors: bool,
}

impl Default for SurfacePreferences {
    fn default() -> Self {
        Self { toast_for_info: true, banner_for_errors: true }
    }
}

impl SurfacePreferences {
    pub fn surface_for(&self, severity: Severity) -> Surface {
        match severity {
            Severity::Critical => Surface::Dialog,
            Severity::Error | Severity::Warning if self.banner_for_errors => Surface::Banner,
            Severity::Error | Severity::Warning => Surface::Toast,
            Severity::Info if self.toast_for_info => Surface::Toast,
            Severity::Info => Surface::Banner,
        }
    }
}

/// Anything that can display a notification.
pub trait NotificationSink {
    fn show(&mut self, notification: &Notification, surface: Surface);
}

/// Pick a surface (or use `forced`) and send `notification` to every sink.
pub fn dispatch(
    notification: &Notification,
    prefs: &SurfacePreferences,
    forced: Option<Surface>,
    sinks: &mut [&mut dyn NotificationSink],
) -> Surface {
    let surface = forced.unwrap_or_else(|| prefs.surface_for(notification.severity));
    for sink in sinks.iter_mut() {
        sink.show(notification, surface);
    }
    surface
}
