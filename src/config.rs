//! Settings file for the `tq` tool.
//!
//! ```toml
//! [query]
//! pushdown = true
//!
//! [log]
//! level = "debug"
//!
//! [source]
//! data = "people.json"
//! table = "people"
//! partition = "nl"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::QueryOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown log level '{0}' (expected error, warn, info, debug or trace)")]
    LogLevel(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub query: QuerySection,
    pub log: LogSection,
    pub source: SourceSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub pushdown: bool,
}

impl Default for QuerySection {
    fn default() -> Self {
        QuerySection { pushdown: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        LogSection {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub data: Option<PathBuf>,
    pub table: Option<String>,
    pub partition: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            pushdown: self.query.pushdown,
        }
    }

    /// The configured level as a `log` filter.
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        parse_level(&self.log.level)
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        parse_level(&config.log.level)?;
        Ok(config)
    }
}

pub fn parse_level(level: &str) -> Result<log::LevelFilter, ConfigError> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Ok(log::LevelFilter::Off),
        "error" => Ok(log::LevelFilter::Error),
        "warn" => Ok(log::LevelFilter::Warn),
        "info" => Ok(log::LevelFilter::Info),
        "debug" => Ok(log::LevelFilter::Debug),
        "trace" => Ok(log::LevelFilter::Trace),
        _ => Err(ConfigError::LogLevel(level.to_string())),
    }
}
