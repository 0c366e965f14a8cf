//! Configuration management.
//!
//! Values come from an optional TOML file layered under `PATHWARDEN__*`
//! environment variables, e.g. `PATHWARDEN__POLICY__PATH=/etc/policy.csv`.

use serde::Deserialize;
use std::path::PathBuf;

use crate::middleware::IdentityConfig;
use crate::rbac::PolicyFormat;
use crate::telemetry::LoggingConfig;

const ENV_PREFIX: &str = "PATHWARDEN";
const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// Identity header configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Policy document path
    #[serde(default = "default_policy_path")]
    pub path: PathBuf,

    /// Explicit format; inferred from the extension when absent
    #[serde(default)]
    pub format: Option<PolicyFormat>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            path: default_policy_path(),
            format: None,
        }
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_policy_path() -> PathBuf { PathBuf::from("config/policy.csv") }

impl Config {
    /// Load `config/default.toml` if present, then the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }
}
