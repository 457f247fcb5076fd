//! Configuration management
//!
//! Reads `settings.json` from the data directory:
//! ```json
//! {
//!   "coreDatabase": "core.duckdb",
//!   "historyDatabase": "history.duckdb",
//!   "defaultPageLimit": 10,
//!   "maxPageLimit": 200,
//!   "queryTimeoutMs": 5000
//! }
//! ```
//! Every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::page::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::domain::result::Error;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    core_database: Option<String>,
    #[serde(default)]
    history_database: Option<String>,
    #[serde(default)]
    default_page_limit: Option<u64>,
    #[serde(default)]
    max_page_limit: Option<u64>,
    #[serde(default)]
    query_timeout_ms: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub core_database: String,
    pub history_database: String,
    pub default_page_limit: u64,
    pub max_page_limit: u64,
    pub query_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core_database: "core.duckdb".to_string(),
            history_database: "history.duckdb".to_string(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: MAX_PAGE_LIMIT,
            query_timeout: None,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The query timeout can be overridden with `LUMEN_QUERY_TIMEOUT_MS`
    /// (`0` disables it).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let env_timeout = match std::env::var("LUMEN_QUERY_TIMEOUT_MS") {
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .context("LUMEN_QUERY_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            Err(_) => None,
        };

        let config = Self::from_settings(raw, env_timeout);
        config.validate()?;
        Ok(config)
    }

    fn from_settings(raw: SettingsFile, env_timeout_ms: Option<u64>) -> Self {
        let defaults = Self::default();
        let timeout_ms = env_timeout_ms.or(raw.query_timeout_ms);

        Self {
            core_database: raw.core_database.unwrap_or(defaults.core_database),
            history_database: raw.history_database.unwrap_or(defaults.history_database),
            default_page_limit: raw.default_page_limit.unwrap_or(defaults.default_page_limit),
            max_page_limit: raw.max_page_limit.unwrap_or(defaults.max_page_limit),
            query_timeout: timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
        }
    }

    /// Reject limit combinations no request could satisfy
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.default_page_limit == 0 || self.max_page_limit == 0 {
            return Err(Error::Config("page limits must be positive".to_string()));
        }
        if self.max_page_limit > i64::MAX as u64 {
            return Err(Error::Config(format!(
                "maxPageLimit ({}) is too large",
                self.max_page_limit
            )));
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(Error::Config(format!(
                "defaultPageLimit ({}) exceeds maxPageLimit ({})",
                self.default_page_limit, self.max_page_limit
            )));
        }
        Ok(())
    }

    pub fn core_db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.core_database)
    }

    pub fn history_db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.history_database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(json: &str) -> SettingsFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_settings(SettingsFile::default(), None);
        assert_eq!(config, Config::default());
        assert_eq!(config.core_db_path(dir.path()), dir.path().join("core.duckdb"));
    }

    #[test]
    fn test_settings_override_defaults() {
        let raw = settings(
            r#"{"historyDatabase": "idx.duckdb", "maxPageLimit": 50, "queryTimeoutMs": 250}"#,
        );
        let config = Config::from_settings(raw, None);
        assert_eq!(config.history_database, "idx.duckdb");
        assert_eq!(config.core_database, "core.duckdb");
        assert_eq!(config.max_page_limit, 50);
        assert_eq!(config.query_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_env_timeout_wins_and_zero_disables() {
        let raw = settings(r#"{"queryTimeoutMs": 250}"#);
        let config = Config::from_settings(raw.clone(), Some(1000));
        assert_eq!(config.query_timeout, Some(Duration::from_secs(1)));

        let config = Config::from_settings(raw, Some(0));
        assert_eq!(config.query_timeout, None);
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_page_limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn test_inconsistent_limits_rejected() {
        let config = Config::from_settings(
            settings(r#"{"defaultPageLimit": 20, "maxPageLimit": 5}"#),
            None,
        );
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = Config::from_settings(settings(r#"{"maxPageLimit": 0}"#), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_limit_must_fit_sql_bigint() {
        let raw = settings(r#"{"maxPageLimit": 18446744073709551615}"#);
        let config = Config::from_settings(raw, None);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let raw = settings(r#"{"maxPageLimit": 9223372036854775807}"#);
        assert!(Config::from_settings(raw, None).validate().is_ok());
    }
}
