mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration named by `CONFIG_PATH`, falling back to
/// `config.yaml` and then to compiled-in defaults, and applies `BRIDGE_*`
/// environment overrides on top.
pub async fn load() -> Result<Config> {
    load_with(|key| env::var(key).ok(), |path| Path::new(path).exists()).await
}

/// [`load`] with the environment and the filesystem check supplied by the caller.
pub async fn load_with<L, E>(lookup: L, exists: E) -> Result<Config>
where
    L: Fn(&str) -> Option<String>,
    E: Fn(&str) -> bool,
{
    let config = match resolve_path(&lookup, exists) {
        Some(path) => load_from(&path).await?,
        None => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    config.with_overrides(lookup)
}

/// Picks the configuration file: `CONFIG_PATH` when set, even if the file
/// is missing, otherwise `config.yaml` when it exists.
pub fn resolve_path<L, E>(lookup: L, exists: E) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
    E: Fn(&str) -> bool,
{
    match lookup("CONFIG_PATH") {
        Some(path) => Some(path),
        None if exists(DEFAULT_CONFIG_PATH) => Some(DEFAULT_CONFIG_PATH.to_string()),
        None => None,
    }
}

pub async fn load_from(path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", path);

    let config_str = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// Validates that a log level string is valid
pub fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            Error::config(format!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            ))
        })?;
    Ok(())
}

impl Config {
    /// Applies `BRIDGE_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BRIDGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("BRIDGE_PORT") {
            self.server.port = parse_var("BRIDGE_PORT", &port)?;
        }
        if let Some(url) = lookup("BRIDGE_UPSTREAM_URL") {
            self.upstream.url = url;
        }
        if let Some(token) = lookup("BRIDGE_UPSTREAM_TOKEN") {
            self.upstream.token = token;
        }
        if let Some(timeout) = lookup("BRIDGE_UPSTREAM_TIMEOUT_MS") {
            self.upstream.timeout_ms = parse_var("BRIDGE_UPSTREAM_TIMEOUT_MS", &timeout)?;
        }
        if let Some(accept) = lookup("BRIDGE_ACCEPT_INVALID_CERTS") {
            self.upstream.accept_invalid_certs = parse_var("BRIDGE_ACCEPT_INVALID_CERTS", &accept)?;
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("Invalid value for {}: '{}'", name, value)))
}
