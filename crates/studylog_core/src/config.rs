//! Runtime configuration.
//!
//! Resolved in priority order:
//! 1. **Environment variables**: `STUDYLOG_BACKEND`, `STUDYLOG_DB_PATH`,
//!    `STUDYLOG_LOG_LEVEL`, `STUDYLOG_LOG_DIR`.
//! 2. **Config file**: a TOML file passed explicitly by the caller.
//! 3. **Compiled defaults** via `#[config(default = ...)]`.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `backend` | `sqlite` | Storage backend, `sqlite` or `memory` |
//! | `db_path` | `studylog.sqlite3` | SQLite database file |
//! | `log_level` | build-mode default | trace, debug, info, warn or error |
//! | `log_dir` | unset | Absolute log directory; file logging is off when unset |

use crate::logging::default_log_level;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),
    #[error(transparent)]
    Load(#[from] confique::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("unknown backend `{0}`; expected sqlite|memory")]
pub struct UnknownBackend(pub String);

/// Storage backend chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Memory,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

fn parse_backend(value: &str) -> Result<BackendKind, UnknownBackend> {
    value.parse()
}

/// Configuration for studylog, usually stored in `studylog.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StudylogConfig {
    #[config(default = "sqlite", env = "STUDYLOG_BACKEND", parse_env = parse_backend)]
    pub backend: BackendKind,

    /// Ignored by the memory backend.
    #[config(default = "studylog.sqlite3", env = "STUDYLOG_DB_PATH")]
    pub db_path: PathBuf,

    #[config(env = "STUDYLOG_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[config(env = "STUDYLOG_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Default for StudylogConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            db_path: PathBuf::from("studylog.sqlite3"),
            log_level: None,
            log_dir: None,
        }
    }
}

impl StudylogConfig {
    /// Loads env vars layered over `path` (when given) over defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    /// Configured level, or the build-mode default.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, ConfigError, StudylogConfig, UnknownBackend};
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    #[test]
    fn default_config_uses_sqlite_file() {
        let config = StudylogConfig::default();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("studylog.sqlite3"));
        assert_eq!(config.log_level(), default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn configured_log_level_wins_over_default() {
        let config = StudylogConfig {
            log_level: Some("error".to_string()),
            ..StudylogConfig::default()
        };
        assert_eq!(config.log_level(), "error");
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!(" sqlite ".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!(matches!(
            "redis".parse::<BackendKind>(),
            Err(UnknownBackend(_))
        ));
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studylog.toml");
        std::fs::write(
            &path,
            "backend = \"memory\"\ndb_path = \"/tmp/words.sqlite3\"\nlog_level = \"warn\"\n",
        )
        .unwrap();

        let config = StudylogConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.db_path, PathBuf::from("/tmp/words.sqlite3"));
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StudylogConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }
}
