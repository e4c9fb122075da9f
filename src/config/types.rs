use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Fixed parameters of the outbound chatbot call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,
    /// Sent verbatim in the `token` header.
    #[serde(default = "default_token")]
    pub token: String,
    #[serde(default = "default_vista")]
    pub vista: String,
    /// Sent as `controladorOModulo`.
    #[serde(default = "default_controller")]
    pub controller: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Skips server certificate validation. The upstream serves a
    /// self-signed certificate; set to `false` to validate again.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_keep_alive")]
    pub keep_alive: bool,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            token: default_token(),
            vista: default_vista(),
            controller: default_controller(),
            timeout_ms: default_timeout_ms(),
            accept_invalid_certs: default_accept_invalid_certs(),
            keep_alive: default_keep_alive(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_upstream_url() -> String {
    "https://trak-smart.trareysa.com:8093/api/chatbot/ask".to_string()
}

fn default_token() -> String {
    "APIKEY_EMPRESA_SOFTGATE_001".to_string()
}

fn default_vista() -> String {
    "CFDI".to_string()
}

fn default_controller() -> String {
    "SoporteCfdiController".to_string()
}

fn default_timeout_ms() -> u64 {
    45_000
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_keep_alive() -> bool {
    true
}
