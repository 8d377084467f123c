//! CLI command implementations for the `msp` binary.

pub mod check;
pub mod notify;
pub mod providers;
pub mod query;

use anyhow::{Context, Result, anyhow, bail};
use msp_core::MspConfig;
use msp_providers::{InMemoryClientDirectory, Provider, ProviderContext, ProviderRegistry};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Build the adapter configured under `provider_id`, backed by the clients
/// listed in the configuration.
pub fn build_provider(config: &MspConfig, provider_id: &str) -> Result<Box<dyn Provider>> {
    let provider_config = config
        .provider(provider_id)
        .ok_or_else(|| anyhow!("no provider with id '{provider_id}' in configuration"))?
        .clone();
    let directory = InMemoryClientDirectory::new(config.clients.iter().cloned());
    let provider = ProviderRegistry::with_builtin()
        .create(provider_config, ProviderContext::new(Arc::new(directory)))
        .with_context(|| format!("cannot construct provider '{provider_id}'"))?;
    if !provider.is_enabled() {
        bail!("provider '{provider_id}' is disabled; run `msp check` for details");
    }
    Ok(provider)
}

/// Parse `key=value`. The value is read as JSON when it parses, otherwise
/// kept as a string, so `limit=10` is a number and `name=Acme` a string.
pub fn parse_pair(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pairs_prefer_json_values() {
        assert_eq!(parse_pair("limit=10").unwrap(), ("limit".into(), json!(10)));
        assert_eq!(parse_pair("resolved=false").unwrap(), ("resolved".into(), json!(false)));
        assert_eq!(parse_pair("name=Acme Inc").unwrap(), ("name".into(), json!("Acme Inc")));
        assert_eq!(parse_pair("ids=[\"a\",\"b\"]").unwrap(), ("ids".into(), json!(["a", "b"])));
        assert_eq!(parse_pair("q=a=b").unwrap(), ("q".into(), json!("a=b")));
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn unknown_provider_id_is_an_error() {
        let config = MspConfig::from_yaml("providers: []\n").unwrap();
        let err = build_provider(&config, "cw").err().unwrap();
        assert!(err.to_string().contains("no provider with id 'cw'"));
    }

    #[test]
    fn disabled_provider_is_refused() {
        let config = MspConfig::from_yaml(
            "providers:\n  - provider_id: s1\n    type: sentinelone\n",
        )
        .unwrap();
        let err = build_provider(&config, "s1").err().unwrap();
        assert!(err.to_string().contains("disabled"));
    }
}
