//! Per-provider configuration.
//!
//! One `ProviderConfig` block describes one adapter instance: which vendor
//! it talks to, where, and with which credentials. Credentials can be given
//! inline under `authentication` or indirectly through environment variables
//! listed in `authentication_env`; the latter are folded into
//! `authentication` when the configuration is loaded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Configuration for a single provider instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identifier of this instance, unique within a configuration.
    pub provider_id: String,

    /// Provider type tag (`connectwise-manage`, `sentinelone`, `veeam`, `itglue`).
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Vendor API base URL. Falls back to `authentication.base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Vendor credentials and connection parameters.
    #[serde(default)]
    pub authentication: BTreeMap<String, String>,

    /// Authentication keys whose value comes from an environment variable.
    /// Maps authentication key to variable name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub authentication_env: BTreeMap<String, String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to verify the vendor's TLS certificate. Vendor default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,
}

impl ProviderConfig {
    pub fn new(provider_id: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_type: provider_type.into(),
            base_url: None,
            authentication: BTreeMap::new(),
            authentication_env: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            verify_tls: None,
        }
    }

    pub fn with_auth(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.authentication.insert(key.into(), value.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Non-empty authentication value for `key`.
    pub fn auth(&self, key: &str) -> Option<&str> {
        self.authentication
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Required keys that have no usable value, in the order given.
    pub fn missing(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .filter(|key| self.auth(key).is_none())
            .map(|key| key.to_string())
            .collect()
    }

    /// Configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| self.auth("base_url"))
    }

    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url().unwrap_or(default)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fold `authentication_env` references into `authentication`.
    ///
    /// Variables that are not set leave the key absent so that the adapter
    /// reports it as missing. Inline values are overwritten by set variables.
    pub fn resolve_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, var) in &self.authentication_env {
            if let Some(value) = lookup(var) {
                self.authentication.insert(key.clone(), value);
            }
        }
    }

    pub fn resolve_env(&mut self) {
        self.resolve_env_with(|var| std::env::var(var).ok());
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authentication: BTreeMap<&str, &str> = self
            .authentication
            .iter()
            .map(|(k, v)| {
                let shown = if is_public_key(k) { v.as_str() } else { "<redacted>" };
                (k.as_str(), shown)
            })
            .collect();
        f.debug_struct("ProviderConfig")
            .field("provider_id", &self.provider_id)
            .field("provider_type", &self.provider_type)
            .field("base_url", &self.base_url)
            .field("authentication", &authentication)
            .field("authentication_env", &self.authentication_env)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

// Authentication keys that carry no secret.
fn is_public_key(key: &str) -> bool {
    matches!(key, "base_url" | "company_id" | "account_id" | "username")
}

fn default_timeout_secs() -> u64 {
    30
}
