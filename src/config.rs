// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::db::{self, Location};
use crate::models::Currency;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the database file; the platform data dir when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_currency")]
    pub currency: Currency,

    #[serde(default = "default_recent")]
    pub recent: usize,
}

fn default_db_name() -> String {
    db::DB_NAME.to_string()
}

fn default_version() -> u32 {
    db::SCHEMA_VERSION
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_recent() -> usize {
    15
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
            version: default_version(),
            dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            recent: default_recent(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    db::config_dir().map(|d| d.join("config.toml"))
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("Invalid config file")
    }

    /// Reads `path` (or the default location). A missing file yields defaults;
    /// a present but malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => p,
            None => return Ok(Config::default()),
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Failed to load {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e).with_context(|| format!("Read {}", path.display())),
        }
    }

    pub fn location(&self) -> Location {
        match &self.database.dir {
            Some(dir) => Location::Dir(dir.clone()),
            None => Location::DataDir,
        }
    }
}
