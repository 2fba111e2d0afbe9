//! Application settings loaded from config.toml
//!
//! Every section is optional; missing values fall back to the named constants
//! in `core::resolver` and `core::alert` so the thresholds stay in one place.

use crate::core::alert::DEFAULT_EXPIRY_WARNING_DAYS;
use crate::core::resolver::{RELEVANCE_FLOOR, REUSE_THRESHOLD};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Fuzzy matching thresholds
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Alert generation settings
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Catalog products to seed on startup
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

/// Thresholds used by the product resolver and its callers
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MatchingConfig {
    /// Candidates scoring below this are ignored entirely
    #[serde(default = "default_relevance_floor")]
    pub relevance_floor: f64,
    /// Ingestion reuses an existing product at or above this score
    #[serde(default = "default_reuse_threshold")]
    pub reuse_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            relevance_floor: RELEVANCE_FLOOR,
            reuse_threshold: REUSE_THRESHOLD,
        }
    }
}

const fn default_relevance_floor() -> f64 {
    RELEVANCE_FLOOR
}

const fn default_reuse_threshold() -> f64 {
    REUSE_THRESHOLD
}

/// Alert generation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AlertConfig {
    /// Items expiring within this many days are "expiring soon"
    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
        }
    }
}

const fn default_expiry_warning_days() -> i64 {
    DEFAULT_EXPIRY_WARNING_DAYS
}

/// A catalog entry to seed
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogProduct {
    /// Product name
    pub name: String,
    /// Product category
    pub category: String,
    /// Default unit
    #[serde(default = "default_unit")]
    pub default_unit: String,
    /// Shelf life, estimated from name/category when absent
    #[serde(default)]
    pub shelf_life_days: Option<i32>,
    /// Dietary tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Low-stock threshold
    #[serde(default)]
    pub min_quantity: Option<f64>,
}

fn default_unit() -> String {
    "unit".to_string()
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.matching.relevance_floor > settings.matching.reuse_threshold {
        return Err(Error::Config {
            message: format!(
                "relevance_floor ({}) must not exceed reuse_threshold ({})",
                settings.matching.relevance_floor, settings.matching.reuse_threshold
            ),
        });
    }

    Ok(settings)
}

/// Loads settings from ./config.toml, or defaults when the file is absent
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        tracing::info!("No config.toml found, using default settings");
        Ok(Settings::default())
    }
}
