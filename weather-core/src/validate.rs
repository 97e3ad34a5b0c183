use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Placeholder text the input box shows before the user types.
pub const CITY_PLACEHOLDER: &str = "Enter city name...";

pub const CITY_FIELD: &str = "city_name";

static CITY_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\s\-\.,']+$").expect("city pattern is a valid regex")
});

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} '{value}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &str, value: &str, reason: &str) -> Self {
        Self { field: field.to_string(), value: value.to_string(), reason: reason.to_string() }
    }
}

/// Check a city search string and return it trimmed.
pub fn validate_city(input: &str) -> Result<&str, ValidationError> {
    let city = input.trim();

    if city.is_empty() || city == CITY_PLACEHOLDER {
        return Err(ValidationError::new(CITY_FIELD, "", "City name is required"));
    }
    if city.chars().count() < 2 {
        return Err(ValidationError::new(
            CITY_FIELD,
            city,
            "City name must be at least 2 characters long",
        ));
    }
    if !CITY_CHARS.is_match(city) {
        return Err(ValidationError::new(CITY_FIELD, city, "City name contains invalid characters"));
    }

    Ok(city)
}
