//! Store configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment variables.

use std::{env, fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const ENV_DB_PATH: &str = "HIRING_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "HIRING_DB_BUSY_TIMEOUT_MS";

const DEFAULT_DATABASE: &str = "hiring.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Shape of the YAML file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
}

impl StoreConfig {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Reading configuration file {path:?}"))?;
            config
                .apply_yaml(&text)
                .with_context(|| format!("Parsing configuration file {path:?}"))?;
        }
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn apply_yaml(&mut self, text: &str) -> Result<()> {
        let parsed: ConfigFile = if text.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(text)?
        };
        if let Some(database) = parsed.database {
            self.database = database;
        }
        if let Some(timeout) = parsed.busy_timeout_ms {
            self.busy_timeout_ms = timeout;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            self.database = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            self.busy_timeout_ms = raw.trim().parse().with_context(|| {
                format!("{ENV_BUSY_TIMEOUT_MS} must be milliseconds, got '{raw}'")
            })?;
        }
        Ok(())
    }
}
