//! Server configuration.
//!
//! Read from an optional YAML file (`prism.yml`, or the path in
//! `PRISM_CONFIG`) with `PRISM__`-prefixed environment variables layered on
//! top, e.g. `PRISM__SERVER__PORT=9000`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use prism_sources::BackendDescriptor;
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "PRISM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "prism.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrismSettings {
    pub server: ServerSettings,
    /// Backends in precedence order.
    pub composite: Vec<BackendDescriptor>,
}

impl PrismSettings {
    /// Loads from `PRISM_CONFIG` or `prism.yml` in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Loads from `path`. A missing file leaves every setting at its default.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("PRISM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
