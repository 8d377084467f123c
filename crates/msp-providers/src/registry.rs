//! Provider type tag to constructor lookup.

use msp_core::ProviderConfig;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::provider::{Provider, ProviderContext, ProviderDescriptor, ProviderInit};
use crate::vendors::{ConnectWiseProvider, ItGlueProvider, SentinelOneProvider, VeeamProvider};

type Constructor = fn(ProviderConfig, ProviderContext) -> Box<dyn Provider>;

struct Registration {
    descriptor: &'static ProviderDescriptor,
    constructor: Constructor,
}

fn construct<P: ProviderInit>(config: ProviderConfig, ctx: ProviderContext) -> Box<dyn Provider> {
    Box::new(P::initialize(config, ctx))
}

/// Registry of adapter constructors keyed by provider type tag.
///
/// Built once at startup and read-only afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: BTreeMap<&'static str, Registration>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the four built-in vendor adapters.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.entries.extend(
            [
                registration::<ConnectWiseProvider>(),
                registration::<SentinelOneProvider>(),
                registration::<VeeamProvider>(),
                registration::<ItGlueProvider>(),
            ]
            .into_iter()
            .map(|entry| (entry.descriptor.provider_type, entry)),
        );
        registry
    }

    /// Register an adapter under its descriptor's type tag.
    pub fn register<P: ProviderInit>(&mut self) -> Result<()> {
        let entry = registration::<P>();
        let tag = entry.descriptor.provider_type;
        if self.entries.contains_key(tag) {
            return Err(ProviderError::DuplicateProviderType(tag.to_string()));
        }
        debug!(provider_type = tag, "registered provider");
        self.entries.insert(tag, entry);
        Ok(())
    }

    /// Construct the adapter for `config.provider_type`.
    ///
    /// Missing credentials do not fail here: the adapter comes up disabled.
    pub fn create(&self, config: ProviderConfig, ctx: ProviderContext) -> Result<Box<dyn Provider>> {
        let entry = self
            .entries
            .get(config.provider_type.trim())
            .ok_or_else(|| ProviderError::UnknownProviderType(config.provider_type.clone()))?;
        Ok((entry.constructor)(config, ctx))
    }

    pub fn get(&self, provider_type: &str) -> Option<&'static ProviderDescriptor> {
        self.entries.get(provider_type).map(|entry| entry.descriptor)
    }

    /// Every registered descriptor, ordered by type tag.
    pub fn descriptors(&self) -> Vec<&'static ProviderDescriptor> {
        self.entries.values().map(|entry| entry.descriptor).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn registration<P: ProviderInit>() -> Registration {
    Registration {
        descriptor: P::describe(),
        constructor: construct::<P>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{NotifyRequest, QueryRequest};

    #[test]
    fn builtin_catalog_is_sorted_by_tag() {
        let registry = ProviderRegistry::with_builtin();
        let tags: Vec<&str> = registry.descriptors().iter().map(|d| d.provider_type).collect();
        assert_eq!(tags, vec!["connectwise-manage", "itglue", "sentinelone", "veeam"]);
        assert_eq!(registry.get("veeam").unwrap().display_name, "Veeam Backup & Replication");
        assert!(registry.get("datto").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ProviderRegistry::new();
        registry.register::<VeeamProvider>().unwrap();
        let err = registry.register::<VeeamProvider>().unwrap_err();
        assert!(matches!(err, ProviderError::DuplicateProviderType(tag) if tag == "veeam"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = ProviderRegistry::with_builtin();
        let err = registry
            .create(ProviderConfig::new("x", "datto-rmm"), ProviderContext::default())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::UnknownProviderType(tag) if tag == "datto-rmm"));
    }

    #[tokio::test]
    async fn missing_credentials_produce_disabled_adapter() {
        let registry = ProviderRegistry::with_builtin();
        let provider = registry
            .create(ProviderConfig::new("s1", "sentinelone"), ProviderContext::default())
            .unwrap();
        assert_eq!(provider.provider_id(), "s1");
        assert!(!provider.is_enabled());
        assert!(provider.query(&QueryRequest::default()).await.is_empty());
        let result = provider.notify(&NotifyRequest::action("isolate")).await;
        assert_eq!(result.message, "Client not initialized");
    }

    #[test]
    fn configured_adapter_is_enabled() {
        let registry = ProviderRegistry::with_builtin();
        let config = ProviderConfig::new("itg", "itglue").with_auth("api_key", "k");
        let provider = registry.create(config, ProviderContext::default()).unwrap();
        assert!(provider.is_enabled());
        assert_eq!(provider.descriptor().display_name, "IT Glue");
    }
}
