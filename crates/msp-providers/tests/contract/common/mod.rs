//! Shared fixtures for the provider contract tests.
//!
//! This module provides:
//! - The crate's scripted transport, re-exported
//! - Ready-made configurations for each vendor
//! - Adapter builders wired to the scripted transport

use msp_core::{ClientRecord, ProviderConfig};
use msp_providers::{
    ConnectWiseProvider, InMemoryClientDirectory, ItGlueProvider, Provider, SentinelOneProvider,
    VeeamProvider,
};
use std::sync::Arc;

pub use msp_providers::test_utils::{MockTransport, Reply};

pub const VEEAM_TOKEN_PATH: &str = "/api/oauth2/token";

// =============================================================================
// CONFIGURATIONS
// =============================================================================

pub fn connectwise_config() -> ProviderConfig {
    ProviderConfig::new("cw-main", "connectwise-manage")
        .with_base_url("https://cw.example.com/v4_6_release/apis/3.0")
        .with_auth("company_id", "acme")
        .with_auth("public_key", "pub")
        .with_auth("private_key", "priv")
        .with_auth("client_id", "integration-1")
}

pub fn sentinelone_config() -> ProviderConfig {
    ProviderConfig::new("s1-main", "sentinelone").with_auth("api_token", "s1-token")
}

pub fn veeam_config() -> ProviderConfig {
    ProviderConfig::new("veeam-main", "veeam")
        .with_base_url("https://veeam.example.com:9419")
        .with_auth("username", "svc-backup")
        .with_auth("password", "hunter2")
}

pub fn itglue_config() -> ProviderConfig {
    ProviderConfig::new("itg-main", "itglue").with_auth("api_key", "ITG.key")
}

// =============================================================================
// ADAPTERS
// =============================================================================

fn directory(clients: Vec<ClientRecord>) -> Arc<InMemoryClientDirectory> {
    Arc::new(InMemoryClientDirectory::new(clients))
}

/// All four adapters over the same transport, with no known clients.
pub fn all_adapters(transport: &Arc<MockTransport>) -> Vec<Box<dyn Provider>> {
    vec![
        Box::new(connectwise(transport, vec![])),
        Box::new(sentinelone(transport, vec![])),
        Box::new(veeam(transport, vec![])),
        Box::new(itglue(transport, vec![])),
    ]
}

pub fn connectwise(transport: &Arc<MockTransport>, clients: Vec<ClientRecord>) -> ConnectWiseProvider {
    ConnectWiseProvider::with_transport(&connectwise_config(), directory(clients), transport.clone())
}

pub fn sentinelone(transport: &Arc<MockTransport>, clients: Vec<ClientRecord>) -> SentinelOneProvider {
    SentinelOneProvider::with_transport(&sentinelone_config(), directory(clients), transport.clone())
}

pub fn veeam(transport: &Arc<MockTransport>, clients: Vec<ClientRecord>) -> VeeamProvider {
    VeeamProvider::with_transport(&veeam_config(), directory(clients), transport.clone())
}

pub fn itglue(transport: &Arc<MockTransport>, clients: Vec<ClientRecord>) -> ItGlueProvider {
    ItGlueProvider::with_transport(&itglue_config(), directory(clients), transport.clone())
}
