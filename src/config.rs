use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::headers::Headers;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "TACO_HTTP_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Applies to each individual socket read
    pub read_timeout_secs: u64,
    /// Merged into every outgoing response
    pub default_headers: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_timeout_secs: 30,
            default_headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads the config file named by `TACO_HTTP_CONFIG` (if set), then
    /// applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Maximum tracing level; unknown values fall back to `info`.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl ServerConfig {
    /// Splits `listen_addr` into host and port.
    pub fn host_port(&self) -> anyhow::Result<(String, u16)> {
        let (host, port) = self
            .listen_addr
            .rsplit_once(':')
            .with_context(|| format!("listen address `{}` has no port", self.listen_addr))?;
        let port = port
            .parse()
            .with_context(|| format!("invalid port in listen address `{}`", self.listen_addr))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');

        Ok((host.to_string(), port))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn default_headers(&self) -> Headers {
        Headers::from(&self.default_headers)
    }
}
