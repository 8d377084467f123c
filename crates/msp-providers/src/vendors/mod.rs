//! Vendor adapters.
//!
//! Each adapter keeps an inner client whose methods return
//! `Result<_, ProviderError>`; the [`Provider`](crate::Provider) impl is the
//! only place where errors are logged and turned into empty lists or failed
//! action results.

pub mod connectwise;
pub mod itglue;
pub mod sentinelone;
pub mod veeam;

use msp_core::{ActionResult, ProviderConfig};
use std::sync::Arc;
use tracing::error;

use crate::error::{ProviderError, Result};
use crate::provider::Entity;
use crate::transport::{ReqwestTransport, Transport};

pub use connectwise::ConnectWiseProvider;
pub use itglue::ItGlueProvider;
pub use sentinelone::SentinelOneProvider;
pub use veeam::VeeamProvider;

pub(crate) const CLIENT_NOT_INITIALIZED: &str = "Client not initialized";

pub(crate) fn http_transport(
    config: &ProviderConfig,
    base_url: &str,
    accept_invalid_certs: bool,
) -> Result<Arc<dyn Transport>> {
    let transport = ReqwestTransport::new(base_url, config.timeout(), accept_invalid_certs)?;
    Ok(Arc::new(transport))
}

/// Log a failed query and degrade it to an empty result.
pub(crate) fn degrade_query(
    provider_id: &str,
    query_type: &str,
    result: Result<Vec<Entity>>,
) -> Vec<Entity> {
    match result {
        Ok(entities) => entities,
        Err(e) => {
            error!(provider = %provider_id, query_type, error = %e, "query failed");
            Vec::new()
        }
    }
}

/// Log a failed action and degrade it to an unsuccessful result.
pub(crate) fn degrade_action(
    provider_id: &str,
    action: &str,
    result: Result<ActionResult>,
) -> ActionResult {
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(provider = %provider_id, action, error = %e, "action failed");
            ActionResult::failure(format!("Error: {e}"))
        }
    }
}

/// Log why an adapter came up disabled.
pub(crate) fn log_disabled(provider_id: &str, provider_type: &str, e: &ProviderError) {
    error!(provider = %provider_id, provider_type, error = %e, "provider disabled");
}

/// Capitalize the first letter, lowercase the rest.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
