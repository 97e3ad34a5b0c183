use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};
use thiserror::Error;

pub const MAX_CITY_NAME_LEN: usize = 100;

static FAVORITE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\s\-'\.]+$").expect("favorite pattern is a valid regex")
});

static ABBREVIATIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(St|Mt|Ft)\b\.?").expect("abbreviation pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoriteError {
    #[error("Invalid city name '{0}'. Use 1-100 letters, spaces, hyphens, apostrophes or periods.")]
    InvalidName(String),

    #[error("Invalid country code '{0}'. Expected two letters, e.g. GB.")]
    InvalidCountry(String),

    #[error("{0} is already in favorites")]
    Duplicate(String),

    #[error("{0} is not in favorites")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
}

impl Favorite {
    /// `Name, CC` or just `Name`.
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    fn matches(&self, name: &str, country: &str) -> bool {
        if !self.name.eq_ignore_ascii_case(name) {
            return false;
        }
        // Country only narrows the match when both sides have one.
        if !country.is_empty() && !self.country.is_empty() {
            return self.country.eq_ignore_ascii_case(country);
        }
        true
    }

    fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty() && (self.country.is_empty() || self.country.len() == 2)
    }
}

/// Ordered list of favorite cities, stored inside the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FavoriteList {
    items: Vec<Favorite>,
}

/// One stored entry; anything that is not a favorite is kept aside and dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Favorite(Favorite),
    Malformed(#[allow(dead_code)] IgnoredAny),
}

impl<'de> Deserialize<'de> for FavoriteList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<StoredEntry>::deserialize(deserializer)?;
        let total = entries.len();
        let items: Vec<Favorite> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                StoredEntry::Favorite(fav) => Some(fav),
                StoredEntry::Malformed(_) => None,
            })
            .collect();

        if items.len() < total {
            tracing::warn!(dropped = total - items.len(), "skipping unreadable favorites");
        }
        Ok(Self { items })
    }
}

impl FavoriteList {
    pub fn add(&mut self, name: &str, country: &str) -> Result<&Favorite, FavoriteError> {
        let country = validate_input(name, country)?;
        let name = normalize_city_name(name);

        if self.contains(&name, &country) {
            return Err(FavoriteError::Duplicate(name));
        }

        self.items.push(Favorite { name, country, added_date: Some(Utc::now()) });
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove every entry matching `name` (and `country`, when given).
    pub fn remove(&mut self, name: &str, country: &str) -> Result<usize, FavoriteError> {
        let name = normalize_city_name(name);
        let country = country.trim().to_uppercase();

        let before = self.items.len();
        self.items.retain(|f| !f.matches(&name, &country));
        let removed = before - self.items.len();

        if removed == 0 {
            Err(FavoriteError::NotFound(name))
        } else {
            Ok(removed)
        }
    }

    pub fn contains(&self, name: &str, country: &str) -> bool {
        let name = normalize_city_name(name);
        let country = country.trim().to_uppercase();
        self.items.iter().any(|f| f.matches(&name, &country))
    }

    /// Sorted by name, case-insensitively; equal names keep insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Favorite> + '_ {
        let mut sorted: Vec<&Favorite> = self.items.iter().collect();
        sorted.sort_by_cached_key(|f| f.name.to_lowercase());
        sorted.into_iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(Favorite::display_name).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop hand-edited entries that would break lookups; returns how many went.
    pub fn retain_valid(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(Favorite::is_well_formed);
        before - self.items.len()
    }
}

fn validate_input(name: &str, country: &str) -> Result<String, FavoriteError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_CITY_NAME_LEN
        || !FAVORITE_CHARS.is_match(trimmed)
    {
        return Err(FavoriteError::InvalidName(name.to_string()));
    }

    let country = country.trim().to_uppercase();
    if !country.is_empty() && (country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Err(FavoriteError::InvalidCountry(country));
    }

    Ok(country)
}

/// Title-case words and dot common abbreviations: `st petersburg` → `St. Petersburg`.
pub fn normalize_city_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut start_of_word = true;

    for ch in name.trim().chars() {
        if ch.is_alphabetic() {
            if start_of_word {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(ch);
            start_of_word = ch.is_whitespace() || ch == '-';
        }
    }

    ABBREVIATIONS.replace_all(&out, "$1.").into_owned()
}
