//! Configuration loading and defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub app_info: AppInfo,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file. Falls back to the XDG data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Milliseconds to wait on a locked database.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Configured path, or the default data path.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(notes_common::database_path)
    }
}

/// Project metadata seeded into the `app_info` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            version: default_version(),
            author: default_author(),
            description: String::new(),
        }
    }
}

impl AppInfo {
    /// Key/value rows in seed order.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("project_name", self.project_name.as_str()),
            ("version", self.version.as_str()),
            ("author", self.author.as_str()),
            ("description", self.description.as_str()),
        ]
    }
}

fn default_busy_timeout_ms() -> u64 {
    crate::database::DEFAULT_BUSY_TIMEOUT.as_millis() as u64
}

fn default_project_name() -> String {
    "notes_database".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_author() -> String {
    "John Doe".to_string()
}

impl Config {
    /// Load configuration from the default file, or defaults if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(&notes_common::config_path())
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.database.path, None);
        assert_eq!(config.app_info.project_name, "notes_database");
        assert_eq!(config.app_info.description, "");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/srv/notes.db\"\n\n[app_info]\nauthor = \"Ada\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database.resolved_path(), PathBuf::from("/srv/notes.db"));
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(config.app_info.author, "Ada");
        assert_eq!(config.app_info.project_name, "notes_database");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database\nbusy_timeout_ms = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_app_info_entries() {
        let keys: Vec<_> = AppInfo::default().entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["project_name", "version", "author", "description"]);
    }
}
