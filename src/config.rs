// rc-file configuration
//
// `~/.testlens/rc` (or `$TESTLENS_HOME/rc`) holds `key=value` lines:
//
//   data.location=./search.db   database path, relative to the rc directory
//   tenant.id=acme              tenant used when --tenant is not given
//   log.level=debug             default log filter when RUST_LOG is unset

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crate::models::DEFAULT_TENANT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_location: PathBuf,
    pub tenant_id: String,
    pub log_level: Option<String>,
    /// Problems found while reading the rc file, logged once logging is up
    pub warnings: Vec<String>,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("TESTLENS_HOME") {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".testlens")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("rc")
    }

    pub fn defaults(config_dir: &Path) -> Self {
        Self {
            data_location: config_dir.join("search.db"),
            tenant_id: DEFAULT_TENANT.to_string(),
            log_level: None,
            warnings: Vec::new(),
        }
    }

    /// Load the rc file if it exists, otherwise defaults
    pub fn load() -> Result<Self> {
        let dir = Self::config_dir();
        let path = dir.join("rc");
        if !path.exists() {
            return Ok(Self::defaults(&dir));
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content, &dir)
    }

    /// Parse rc content; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut config = Self::defaults(base_dir);

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                config
                    .warnings
                    .push(format!("Ignoring config line {}: expected key=value", number + 1));
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "data.location" => {
                    if value.is_empty() {
                        anyhow::bail!("data.location cannot be empty (line {})", number + 1);
                    }
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        base_dir.join(path)
                    } else {
                        path
                    };
                }
                "tenant.id" => {
                    if value.is_empty() {
                        anyhow::bail!("tenant.id cannot be empty (line {})", number + 1);
                    }
                    config.tenant_id = value.to_string();
                }
                "log.level" => config.log_level = Some(value.to_string()),
                other => config
                    .warnings
                    .push(format!("Ignoring unknown config key '{}'", other)),
            }
        }

        Ok(config)
    }
}
