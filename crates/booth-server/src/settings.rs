//! Runtime configuration, layered from an optional TOML file and `BOOTH_*`
//! environment variables.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! crm_webhook_url = "https://crm.example.com/hooks/contacts"
//!
//! [storage]
//! policy = "file"
//! path   = "data/booth.json"
//!
//! [roi]
//! average_customer_value = 500.0
//! conversion_rate        = 0.10
//! cost_per_lead          = 25.0
//! ```
//!
//! Nested keys use `__` in the environment, e.g. `BOOTH_STORAGE__POLICY=memory`.

use std::path::{Path, PathBuf};

use booth_core::report::RoiAssumptions;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "BOOTH";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default)]
  pub storage:         StorageConfig,
  #[serde(default)]
  pub roi:             RoiAssumptions,
  /// When set, new contacts are POSTed here instead of only being logged.
  #[serde(default)]
  pub crm_webhook_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoragePolicy {
  Memory,
  #[default]
  File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
  #[serde(default)]
  pub policy: StoragePolicy,
  #[serde(default = "default_store_path")]
  pub path:   PathBuf,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self { policy: StoragePolicy::default(), path: default_store_path() }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("data/booth.json") }

impl ServerConfig {
  /// Read `path` (if it exists) and then the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
