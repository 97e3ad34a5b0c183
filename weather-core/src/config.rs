use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{
    favorites::FavoriteList,
    notify::{ConfigIssue, SurfacePreferences},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Value shipped in sample configs; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "your_api_key_here";

pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Kelvin,
}

impl Units {
    /// Value of OpenWeather's `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Kelvin => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Kelvin => "K",
        }
    }

    pub fn wind_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Kelvin => "m/s",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Kelvin]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Kelvin => "kelvin",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

/// Where notifications of each severity should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub toast_for_info: bool,
    pub banner_for_errors: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        let prefs = SurfacePreferences::default();
        Self { toast_for_info: prefs.toast_for_info, banner_for_errors: prefs.banner_for_errors }
    }
}

impl From<NotificationSettings> for SurfacePreferences {
    fn from(s: NotificationSettings) -> Self {
        SurfacePreferences { toast_for_info: s.toast_for_info, banner_for_errors: s.banner_for_errors }
    }
}

/// Top-level configuration stored on disk.
///
/// Missing keys fall back to their defaults, so old files keep loading.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// theme = "dark"
///
/// [[favorites]]
/// name = "London"
/// country = "GB"
/// added_date = "2024-06-01T10:00:00Z"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    pub theme: Theme,
    pub auto_refresh: bool,
    /// Seconds between refreshes when `auto_refresh` is on.
    pub refresh_interval: u64,
    pub notifications: NotificationSettings,
    pub favorites: FavoriteList,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::default(),
            theme: Theme::default(),
            auto_refresh: false,
            refresh_interval: 300,
            notifications: NotificationSettings::default(),
            favorites: FavoriteList::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let dropped = cfg.favorites.retain_valid();
        if dropped > 0 {
            tracing::warn!(dropped, "ignoring malformed favorites in config file");
        }

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
    }

    /// Stored key, ignoring blanks and the sample placeholder.
    pub fn stored_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| usable_key(k))
    }

    /// Key to use for requests: the environment wins over the file.
    pub fn effective_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| usable_key(k.trim()))
            .map(|k| k.trim().to_string())
            .or_else(|| self.stored_api_key().map(str::to_string))
    }

    pub fn surface_preferences(&self) -> SurfacePreferences {
        self.notifications.into()
    }

    /// Field name → problem, empty when the configuration is usable.
    pub fn validate(&self) -> BTreeMap<&'static str, String> {
        let mut errors = BTreeMap::new();

        match self.stored_api_key() {
            None => {
                errors.insert("api_key", "API key is required".to_string());
            }
            Some(key) if key.len() < 10 => {
                errors.insert("api_key", "API key appears to be invalid (too short)".to_string());
            }
            Some(_) => {}
        }

        if self.refresh_interval < MIN_REFRESH_INTERVAL_SECS {
            errors.insert(
                "refresh_interval",
                format!("Refresh interval must be at least {MIN_REFRESH_INTERVAL_SECS} seconds"),
            );
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Keep the API key, reset everything else.
    pub fn reset_to_defaults(&mut self) {
        let api_key = self.api_key.take();
        *self = Self { api_key, ..Self::default() };
    }
}

fn usable_key(key: &str) -> bool {
    !key.is_empty() && key != API_KEY_PLACEHOLDER
}

/// Which config notification a load/save failure should raise.
pub fn config_issue(err: &anyhow::Error) -> ConfigIssue {
    if err.downcast_ref::<toml::de::Error>().is_some() {
        ConfigIssue::FileCorrupt
    } else {
        ConfigIssue::LoadFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let cfg = Config::default();
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.theme, Theme::Light);
        assert_eq!(cfg.refresh_interval, 300);
        assert!(cfg.favorites.is_empty());
        assert!(cfg.stored_api_key().is_none());
    }

    #[test]
    fn placeholder_and_blank_keys_count_as_missing() {
        let mut cfg = Config::default();

        cfg.api_key = Some(API_KEY_PLACEHOLDER.into());
        assert!(cfg.stored_api_key().is_none());

        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key, None);

        cfg.set_api_key(" 0123456789abcdef ".into());
        assert_eq!(cfg.stored_api_key(), Some("0123456789abcdef"));
    }

    #[test]
    fn validate_reports_missing_key_and_short_interval() {
        let mut cfg = Config::default();
        cfg.refresh_interval = 30;

        let errors = cfg.validate();
        assert_eq!(errors.get("api_key").map(String::as_str), Some("API key is required"));
        assert!(errors.contains_key("refresh_interval"));
        assert!(!cfg.is_valid());
    }

    #[test]
    fn validate_flags_short_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("abc".into());
        assert!(cfg.validate()["api_key"].contains("too short"));

        cfg.set_api_key("0123456789abcdef".into());
        assert!(cfg.is_valid());
    }

    #[test]
    fn partial_toml_merges_with_defaults() {
        let cfg: Config = toml::from_str("theme = \"dark\"\n").expect("valid toml");
        assert_eq!(cfg.theme, Theme::Dark);
        assert_eq!(cfg.units, Units::Metric);
        assert!(cfg.notifications.toast_for_info);
    }

    #[test]
    fn reset_keeps_api_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("0123456789abcdef".into());
        cfg.theme = Theme::Dark;
        cfg.units = Units::Imperial;

        cfg.reset_to_defaults();

        assert_eq!(cfg.theme, Theme::Light);
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.stored_api_key(), Some("0123456789abcdef"));
    }

    #[test]
    fn kelvin_maps_to_standard_query() {
        assert_eq!(Units::Kelvin.as_query(), "standard");
        assert_eq!(Units::Imperial.temperature_symbol(), "°F");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
