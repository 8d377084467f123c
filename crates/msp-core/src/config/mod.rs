//! Configuration types for the MSP provider layer.
//!
//! A single YAML document lists the provider instances to create and,
//! optionally, the client records used to scope queries to one client.
//!
//! ```yaml
//! observability:
//!   log_level: debug
//! providers:
//!   - provider_id: s1-main
//!     type: sentinelone
//!     authentication_env:
//!       api_token: S1_API_TOKEN
//! clients_file: clients.yaml
//! ```

pub mod provider;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::ClientRecord;

pub use provider::ProviderConfig;

/// Complete configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MspConfig {
    /// Logging settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Provider instances.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Inline client records.
    #[serde(default)]
    pub clients: Vec<ClientRecord>,

    /// YAML file with additional client records (a list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients_file: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config or clients file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML did not match the expected shape.
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Semantically invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MspConfig {
    /// Load configuration from a YAML file without resolving references.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content and validate it.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve all external references.
    ///
    /// This resolves `authentication_env` entries from the process
    /// environment and appends the records of `clients_file`, which is
    /// looked up relative to the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(clients_file) = &config.clients_file {
            let clients_path = if clients_file.is_absolute() {
                clients_file.clone()
            } else {
                base_dir.join(clients_file)
            };
            let content = fs::read_to_string(&clients_path)?;
            let clients: Vec<ClientRecord> = serde_yaml::from_str(&content)?;
            config.clients.extend(clients);
        }

        for provider in &mut config.providers {
            provider.resolve_env();
        }

        Ok(config)
    }

    /// Get a provider block by id.
    pub fn provider(&self, provider_id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.provider_id == provider_id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.provider_id.trim().is_empty() {
                return Err(ConfigError::Config(format!(
                    "provider of type '{}' has an empty provider_id",
                    provider.provider_type
                )));
            }
            if !seen.insert(provider.provider_id.as_str()) {
                return Err(ConfigError::Config(format!(
                    "duplicate provider_id '{}'",
                    provider.provider_id
                )));
            }
        }
        Ok(())
    }
}
