//! Configuration loading for the taskdeck CLI.
//!
//! Looks for `--config`, then `./taskdeck.toml`, then
//! `<config_dir>/taskdeck/config.toml`; falls back to defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskdeck_core::{SortDirection, SortKey, StatusFilter};

const APP_DIR: &str = "taskdeck";
const LOCAL_CONFIG_FILE: &str = "taskdeck.toml";
const DB_FILE_NAME: &str = "tasks.sqlite3";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub list: ListConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; defaults to `<data_dir>/taskdeck/tasks.sqlite3`.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// trace | debug | info | warn | error
    pub level: String,
    /// Absolute directory; defaults to `<data_dir>/taskdeck/logs`.
    pub dir: Option<PathBuf>,
}

/// Defaults for `list` when flags are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub status: String,
    /// Empty keeps insertion order.
    pub sort: String,
    pub direction: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: taskdeck_core::default_log_level().to_string(),
            dir: None,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            status: StatusFilter::All.to_string(),
            sort: String::new(),
            direction: SortDirection::Ascending.to_string(),
        }
    }
}

impl Config {
    /// Loads `explicit` when given, otherwise the first config found on the search path.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                bail!("logging.dir must be an absolute path, got `{}`", dir.display());
            }
        }
        self.default_status()?;
        self.default_sort()?;
        self.default_direction()?;
        Ok(())
    }

    pub fn default_status(&self) -> Result<StatusFilter> {
        self.list
            .status
            .parse::<StatusFilter>()
            .map_err(|err: String| anyhow::anyhow!("list.status: {err}"))
    }

    pub fn default_sort(&self) -> Result<Option<SortKey>> {
        if self.list.sort.trim().is_empty() {
            return Ok(None);
        }
        self.list
            .sort
            .parse::<SortKey>()
            .map(Some)
            .map_err(|err: String| anyhow::anyhow!("list.sort: {err}"))
    }

    pub fn default_direction(&self) -> Result<SortDirection> {
        self.list
            .direction
            .parse::<SortDirection>()
            .map_err(|err: String| anyhow::anyhow!("list.direction: {err}"))
    }

    /// Configured database path, or the platform data directory default.
    pub fn db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.db_path {
            return Ok(path.clone());
        }
        Ok(data_dir()?.join(DB_FILE_NAME))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.logging.dir {
            return Ok(dir.clone());
        }
        Ok(data_dir()?.join("logs"))
    }
}

fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("could not determine a data directory; set storage.db_path and logging.dir")
}
