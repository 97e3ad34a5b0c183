use std::fs;

use tempfile::TempDir;
use weather_core::{
    Config, Theme, Units,
    config::config_issue,
    notify::ConfigIssue,
};

#[test]
fn missing_file_loads_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let cfg = Config::load_from(&dir.path().join("config.toml")).expect("defaults load");
    assert_eq!(cfg, Config::default());
}

#[test]
fn save_then_load_keeps_settings_and_favorites() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.set_api_key("0123456789abcdef".into());
    cfg.units = Units::Imperial;
    cfg.theme = Theme::Dark;
    cfg.favorites.add("paris", "fr").expect("valid favorite");
    cfg.save_to(&path).expect("config saves");

    let loaded = Config::load_from(&path).expect("saved config loads");
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.favorites.names(), vec!["Paris, FR"]);
}

#[test]
fn corrupt_file_maps_to_file_corrupt_issue() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "units = [not toml").expect("write config");

    let err = Config::load_from(&path).expect_err("load should fail");
    assert!(err.to_string().contains("Failed to parse config file"));
    assert_eq!(config_issue(&err), ConfigIssue::FileCorrupt);
}

#[test]
fn unknown_theme_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "theme = \"sepia\"\n").expect("write config");

    let err = Config::load_from(&path).expect_err("load should fail");
    assert_eq!(config_issue(&err), ConfigIssue::FileCorrupt);
}

#[test]
fn unreadable_path_maps_to_load_failed() {
    let dir = TempDir::new().expect("temp dir");
    // A directory where the file should be cannot be read as text.
    let path = dir.path().join("config.toml");
    fs::create_dir(&path).expect("create dir");

    let err = Config::load_from(&path).expect_err("load should fail");
    assert_eq!(config_issue(&err), ConfigIssue::LoadFailed);
}

#[test]
fn malformed_favorites_are_dropped_on_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[[favorites]]
name = "Lisbon"
country = "PT"
added_date = "2024-05-01T08:00:00Z"

[[favorites]]
name = ""
added_date = "2024-05-01T08:00:00Z"
"#,
    )
    .expect("write config");

    let cfg = Config::load_from(&path).expect("config loads");
    assert_eq!(cfg.favorites.names(), vec!["Lisbon, PT"]);
}

#[test]
fn unreadable_favorites_do_not_cost_the_rest_of_the_config() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
api_key = "0123456789abcdef"
units = "imperial"

[[favorites]]
name = "Lisbon"
country = "PT"

[[favorites]]
name = "Rome"

[[favorites]]
country = "FR"

[[favorites]]
name = "Nice"
country = 33
"#,
    )
    .expect("write config");

    let cfg = Config::load_from(&path).expect("config loads despite bad favorites");
    assert_eq!(cfg.api_key.as_deref(), Some("0123456789abcdef"));
    assert_eq!(cfg.units, Units::Imperial);
    assert_eq!(cfg.favorites.names(), vec!["Lisbon, PT", "Rome"]);
    assert!(cfg.favorites.iter().all(|f| f.added_date.is_none()));
}
