use std::io::{self, Stdout};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use weather_core::{
    Config, ErrorClassifier, Notification, Surface, Theme, Units, config::config_issue, dispatch,
    fetch_report, notify::ConfigIssue, provider_from_config, validate_city,
};

use crate::render::{self, TerminalSink};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// Debug logging, and print the session's error log before exiting.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key, units and theme.
    Configure,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. `London` or `New York`.
        city: Vec<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage favorite cities.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Inspect or reset the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    Add {
        city: Vec<String>,
        /// Two-letter country code.
        #[arg(long, default_value = "")]
        country: String,
    },
    Remove {
        city: Vec<String>,
        #[arg(long, default_value = "")]
        country: String,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file location and current settings.
    Show,
    /// Report problems that would stop lookups.
    Validate,
    /// Restore defaults, keeping the API key.
    Reset,
}

/// Per-invocation state: settings, the classifier and the terminal.
struct App {
    config: Config,
    classifier: ErrorClassifier,
    sink: TerminalSink<Stdout>,
}

impl App {
    fn start() -> Self {
        let mut app = Self {
            config: Config::default(),
            classifier: ErrorClassifier::new(),
            sink: TerminalSink::new(io::stdout()),
        };

        match Config::load() {
            Ok(config) => app.config = config,
            Err(err) => {
                tracing::warn!("{err:#}");
                let n = app.classifier.config(config_issue(&err), &format!("{err:#}"));
                app.notify(&n, None);
            }
        }
        app
    }

    fn notify(&mut self, notification: &Notification, forced: Option<Surface>) {
        let prefs = self.config.surface_preferences();
        dispatch(notification, &prefs, forced, &mut [&mut self.sink]);
    }

    fn save(&mut self) -> bool {
        match self.config.save() {
            Ok(()) => true,
            Err(err) => {
                let n = self.classifier.config(ConfigIssue::SaveFailed, &format!("{err:#}"));
                self.notify(&n, None);
                false
            }
        }
    }

    async fn show(&mut self, city_input: &str, json: bool) -> anyhow::Result<()> {
        let city = match validate_city(city_input) {
            Ok(city) => city,
            Err(err) => {
                let n = self.classifier.validation(&err);
                self.notify(&n, None);
                return Ok(());
            }
        };

        let provider = match provider_from_config(&self.config) {
            Ok(provider) => provider,
            Err(_) => {
                let n = self.classifier.missing_credential();
                self.notify(&n, Some(Surface::Banner));
                return Ok(());
            }
        };

        let today = Local::now().date_naive();
        let report = match fetch_report(provider.as_ref(), &mut self.classifier, city, today).await {
            Ok(report) => report,
            Err(n) => {
                self.notify(&n, None);
                return Ok(());
            }
        };

        if json {
            let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{text}");
        } else {
            let units = self.config.units;
            let favorite = self.config.favorites.contains(
                &report.current.location_name,
                report.current.country.as_deref().unwrap_or_default(),
            );
            print!("{}", render::format_current(&report.current, units, favorite));
            if !report.forecast.is_empty() {
                println!();
                print!("{}", render::format_forecast(&report.forecast, units));
            }
        }

        if let Some(n) = &report.forecast_notice {
            self.notify(n, Some(Surface::Toast));
        }
        Ok(())
    }

    fn configure(&mut self) -> anyhow::Result<()> {
        let key = Password::new("OpenWeather API key:")
            .without_confirmation()
            .with_help_message("Leave empty to keep the current key")
            .prompt()
            .context("Failed to read API key")?;
        if !key.trim().is_empty() {
            self.config.set_api_key(key);
        }

        let units_cursor = Units::all().iter().position(|u| *u == self.config.units).unwrap_or(0);
        self.config.units = Select::new("Units:", Units::all().to_vec())
            .with_starting_cursor(units_cursor)
            .prompt()
            .context("Failed to read units")?;

        let themes = vec![Theme::Light, Theme::Dark];
        let theme_cursor = themes.iter().position(|t| *t == self.config.theme).unwrap_or(0);
        self.config.theme = Select::new("Theme:", themes)
            .with_starting_cursor(theme_cursor)
            .prompt()
            .context("Failed to read theme")?;

        if self.save() {
            println!("Configuration saved to {}", Config::config_file_path()?.display());
        }
        Ok(())
    }

    fn favorites(&mut self, action: FavoritesAction) {
        match action {
            FavoritesAction::List => {
                if self.config.favorites.is_empty() {
                    println!("No favorite cities yet.");
                }
                for fav in self.config.favorites.iter() {
                    match fav.added_date {
                        Some(date) => {
                            println!("{}  (added {})", fav.display_name(), date.format("%Y-%m-%d"))
                        }
                        None => println!("{}", fav.display_name()),
                    }
                }
            }
            FavoritesAction::Add { city, country } => {
                let city = city.join(" ");
                let added = self.config.favorites.add(&city, &country).map(|f| f.display_name());
                match added {
                    Ok(name) => {
                        if self.save() {
                            println!("Added {name} to favorites");
                        }
                    }
                    Err(err) => self.report_favorite_error("city", &city, &err.to_string()),
                }
            }
            FavoritesAction::Remove { city, country } => {
                let city = city.join(" ");
                match self.config.favorites.remove(&city, &country) {
                    Ok(_) => {
                        if self.save() {
                            println!("Removed {city} from favorites");
                        }
                    }
                    Err(err) => self.report_favorite_error("favorite", &city, &err.to_string()),
                }
            }
            FavoritesAction::Clear => {
                let count = self.config.favorites.len();
                self.config.favorites.clear();
                if self.save() {
                    println!("Removed {count} favorite(s)");
                }
            }
        }
    }

    fn report_favorite_error(&mut self, field: &str, value: &str, reason: &str) {
        let err = weather_core::ValidationError::new(field, value, reason);
        let n = self.classifier.validation(&err);
        self.notify(&n, None);
    }

    fn config(&mut self, action: ConfigAction) -> anyhow::Result<()> {
        match action {
            ConfigAction::Show => {
                println!("File: {}", Config::config_file_path()?.display());
                let mut shown = self.config.clone();
                if let Some(key) = shown.api_key.as_mut() {
                    *key = mask_key(key);
                }
                print!("{}", toml::to_string_pretty(&shown).context("Failed to render config")?);
            }
            ConfigAction::Validate => {
                let errors = self.config.validate();
                if errors.is_empty() {
                    println!("Configuration is valid.");
                }
                for (field, problem) in errors {
                    println!("{field}: {problem}");
                }
            }
            ConfigAction::Reset => {
                self.config.reset_to_defaults();
                if self.save() {
                    println!("Configuration reset to defaults (API key kept).");
                }
            }
        }
        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}{}", "*".repeat(key.chars().count().saturating_sub(4)))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut app = App::start();

        match self.command {
            Command::Configure => app.configure()?,
            Command::Show { city, json } => app.show(&city.join(" "), json).await?,
            Command::Favorites { action } => app.favorites(action),
            Command::Config { action } => app.config(action)?,
        }

        if self.verbose && !app.classifier.log().is_empty() {
            eprintln!("\nError log:");
            eprint!("{}", render::format_error_log(app.classifier.log()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_multi_word_city() {
        let cli = Cli::try_parse_from(["weather", "show", "New", "York", "--json"]).expect("parses");
        match cli.command {
            Command::Show { city, json } => {
                assert_eq!(city.join(" "), "New York");
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn favorites_add_takes_country() {
        let cli = Cli::try_parse_from(["weather", "favorites", "add", "Paris", "--country", "FR"])
            .expect("parses");
        assert!(matches!(
            cli.command,
            Command::Favorites { action: FavoritesAction::Add { ref country, .. } } if country == "FR"
        ));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["weather", "config", "show", "-v"]).expect("parses");
        assert!(cli.verbose);
    }

    #[test]
    fn masks_all_but_prefix() {
        assert_eq!(mask_key("abcdef123"), "abcd*****");
        assert_eq!(mask_key("ab"), "ab");
    }
}
