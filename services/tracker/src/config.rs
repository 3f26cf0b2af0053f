//! services/tracker/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Holds one `<YYYY-MM-DD>.json` per day plus `diary_entries.json`.
    pub data_dir: PathBuf,
    /// Holds the three catalog files.
    pub catalog_dir: PathBuf,
    pub summary_days: usize,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Storage Locations ---
        let data_dir = lookup("TRACKER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let catalog_dir = lookup("TRACKER_CATALOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        // --- Reporting ---
        let summary_days = match lookup("TRACKER_SUMMARY_DAYS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "TRACKER_SUMMARY_DAYS".to_string(),
                        format!("'{}' is not a positive number of days", raw),
                    )
                })?,
            None => 7,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            data_dir,
            catalog_dir,
            summary_days,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.catalog_dir, PathBuf::from("."));
        assert_eq!(config.summary_days, 7);
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = Config::from_lookup(lookup(&[
            ("TRACKER_DATA_DIR", "/tmp/journal"),
            ("TRACKER_SUMMARY_DAYS", "14"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/journal"));
        assert_eq!(config.summary_days, 14);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = Config::from_lookup(lookup(&[("TRACKER_SUMMARY_DAYS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue(ref var, _) if var == "TRACKER_SUMMARY_DAYS"
        ));

        let err = Config::from_lookup(lookup(&[("RUST_LOG", "chatty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "RUST_LOG"));
    }
}
