use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "taskboard.toml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8082";
pub const DEFAULT_TICK_RATE_MS: u64 = 250;
pub const DEFAULT_LOG_FILE: &str = "taskboard.log";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub tick_rate_ms: Option<u64>,
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub tick_rate_ms: u64,
    pub log_file: String,
}

impl Config {
    /// An explicit `--config` must exist; the default path is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let config = merge(file_config, cli);
        validate(&config)?;
        Ok(config)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(Error::ConfigValidation(format!(
            "base_url must start with http:// or https:// (got: {})",
            config.base_url
        )));
    }
    if config.tick_rate_ms == 0 {
        return Err(Error::ConfigValidation(
            "tick_rate_ms must be > 0".to_string(),
        ));
    }
    if config.log_file.trim().is_empty() {
        return Err(Error::ConfigValidation(
            "log_file must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    let base_url = cli
        .base_url
        .clone()
        .or(file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    Config {
        base_url: base_url.trim_end_matches('/').to_string(),
        tick_rate_ms: cli
            .tick_rate_ms
            .or(file.tick_rate_ms)
            .unwrap_or(DEFAULT_TICK_RATE_MS),
        log_file: cli
            .log_file
            .clone()
            .or(file.log_file)
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    }
}
