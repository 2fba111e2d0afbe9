/// Database configuration and connection management
pub mod database;

/// Matching thresholds, alert windows and catalog seed loaded from config.toml
pub mod settings;
