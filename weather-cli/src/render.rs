use std::{fmt::Write as _, io::Write};

use weather_core::{
    CurrentWeather, DailyForecast, Notification, NotificationSink, Severity, Surface, Units,
    notify::ErrorLog,
};

/// Prints notifications to a terminal stream.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NotificationSink for TerminalSink<W> {
    fn show(&mut self, notification: &Notification, surface: Surface) {
        let text = format_notification(notification, surface);
        // Nowhere left to report a failed terminal write.
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "INFO",
        Severity::Warning => "WARN",
        Severity::Error => "ERROR",
        Severity::Critical => "CRITICAL",
    }
}

pub fn format_notification(notification: &Notification, surface: Surface) -> String {
    let mut s = String::new();
    match surface {
        Surface::Dialog => {
            let title = notification.severity.title();
            let width = title.len().max(notification.message.len()).min(76) + 4;
            let rule = "=".repeat(width);
            let _ = writeln!(s, "{rule}");
            let _ = writeln!(s, "  {title}");
            let _ = writeln!(s, "{}", "-".repeat(width));
            let _ = writeln!(s, "  {}", notification.message);
            if !notification.dismissible {
                let _ = writeln!(s, "  (action required)");
            }
            let _ = writeln!(s, "{rule}");
        }
        Surface::Banner => {
            let _ = writeln!(s, "[{}] {}", severity_tag(notification.severity), notification.message);
        }
        Surface::Toast => {
            let _ = writeln!(s, "  ~ {}", notification.message);
        }
    }
    s
}

pub fn icon_symbol(code: &str) -> &'static str {
    match code.get(..2).unwrap_or_default() {
        "01" => "☀",
        "02" => "⛅",
        "03" | "04" => "☁",
        "09" | "10" => "🌧",
        "11" => "⛈",
        "13" => "❄",
        "50" => "🌫",
        _ => "?",
    }
}

pub fn format_current(current: &CurrentWeather, units: Units, favorite: bool) -> String {
    let t = units.temperature_symbol();
    let mut s = String::new();

    let star = if favorite { " ★" } else { "" };
    let _ = writeln!(s, "{} {}{}", icon_symbol(&current.icon), current.display_name(), star);
    let _ = writeln!(
        s,
        "  {:.1}{t} (feels like {:.1}{t}), {}",
        current.temperature, current.feels_like, current.description
    );
    let _ = write!(
        s,
        "  Humidity {}%  Wind {:.1} {}",
        current.humidity,
        current.wind_speed,
        units.wind_symbol()
    );
    if let Some(p) = current.pressure_hpa {
        let _ = write!(s, "  Pressure {p} hPa");
    }
    s.push('\n');
    let _ = writeln!(s, "  Observed {}", current.observation_time.format("%Y-%m-%d %H:%M UTC"));
    s
}

pub fn format_forecast(days: &[DailyForecast], units: Units) -> String {
    let t = units.temperature_symbol();
    let mut s = String::new();
    for day in days {
        let _ = writeln!(
            s,
            "{} {}  {}  {:>5.1}{t} / {:>5.1}{t}  {:<20}  {:>3}%  {:.1} {}",
            day.day_name,
            day.date_str,
            icon_symbol(&day.icon),
            day.high,
            day.low,
            day.description,
            day.humidity,
            day.wind_speed,
            units.wind_symbol(),
        );
    }
    s
}

pub fn format_error_log(log: &ErrorLog) -> String {
    let mut s = String::new();
    for entry in log.entries() {
        let _ = writeln!(
            s,
            "[{}] {} {}: {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.severity.as_str().to_uppercase(),
            entry.category,
            entry.message
        );
        if !entry.detail.is_empty() {
            let _ = writeln!(s, "  Details: {}", entry.detail);
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use weather_core::{ErrorClassifier, ErrorCategory};

    fn note(severity: Severity, dismissible: bool) -> Notification {
        Notification {
            message: "Something went wrong.".into(),
            category: ErrorCategory::General,
            severity,
            dismissible,
            auto_dismiss_ms: None,
        }
    }

    #[test]
    fn banner_is_single_tagged_line() {
        let text = format_notification(&note(Severity::Warning, true), Surface::Banner);
        assert_eq!(text, "[WARN] Something went wrong.\n");
    }

    #[test]
    fn dialog_marks_sticky_notifications() {
        let text = format_notification(&note(Severity::Critical, false), Surface::Dialog);
        assert!(text.contains("Critical Error"));
        assert!(text.contains("(action required)"));
    }

    #[test]
    fn sink_writes_to_stream() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.show(&note(Severity::Info, true), Surface::Toast);
        let out = String::from_utf8(sink.into_inner()).expect("utf8");
        assert_eq!(out, "  ~ Something went wrong.\n");
    }

    #[test]
    fn forecast_rows_show_high_and_low() {
        let day = DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date"),
            day_name: "Mon".into(),
            date_str: "06/03".into(),
            high: 21.0,
            low: 12.5,
            description: "light rain".into(),
            icon: "10d".into(),
            humidity: 77,
            wind_speed: 4.25,
        };

        let text = format_forecast(&[day], Units::Metric);
        assert!(text.starts_with("Mon 06/03  🌧"));
        assert!(text.contains(" 21.0°C /  12.5°C"));
        assert!(text.contains("77%"));
    }

    #[test]
    fn icons_fall_back_for_unknown_codes() {
        assert_eq!(icon_symbol("01n"), "☀");
        assert_eq!(icon_symbol(""), "?");
    }

    #[test]
    fn error_log_lists_entries_with_details() {
        let mut classifier = ErrorClassifier::new();
        classifier.forecast("Forecast request timed out", true);

        let text = format_error_log(classifier.log());
        assert!(text.contains("INFO forecast:"));
        assert!(text.contains("Details: Forecast request timed out"));
    }
}
