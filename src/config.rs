use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

/// tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub database: DatabaseConfig,
    /// how far ahead the dashboard looks for loans coming due
    pub upcoming_window_days: u32,
}

/// database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `None` keeps everything in memory
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            upcoming_window_days: 7,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

impl TrackerConfig {
    /// in-memory configuration, mostly for tests
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// file-backed configuration
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseConfig {
                path: Some(path.into()),
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| TrackerError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| TrackerError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.upcoming_window_days > 365 {
            return Err(TrackerError::Config {
                message: format!(
                    "upcoming_window_days must be at most 365, got {}",
                    self.upcoming_window_days
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.upcoming_window_days, 7);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_partial_json() {
        let config = TrackerConfig::from_json_str(
            r#"{ "database": { "path": "/tmp/loans.db" }, "upcoming_window_days": 14 }"#,
        )
        .unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/loans.db")));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.upcoming_window_days, 14);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(TrackerConfig::from_json_str(r#"{ "upcoming_window_days": 1000 }"#).is_err());
        assert!(TrackerConfig::from_json_str("not json").is_err());
        assert!(TrackerConfig::from_json_file("/nonexistent/tracker.json").is_err());
    }
}
