//! Behaviour at the `query`/`notify` boundary shared by every adapter.

use super::common::*;
use msp_core::ProviderConfig;
use msp_providers::{
    Method, NotifyRequest, Provider, ProviderContext, ProviderRegistry, QueryRequest,
};
use serde_json::json;

#[tokio::test]
async fn unknown_action_is_unsupported_on_every_adapter() {
    let transport = MockTransport::shared();

    for adapter in all_adapters(&transport) {
        let result = adapter.notify(&NotifyRequest::action("teleport")).await;
        assert!(!result.success, "{}", adapter.provider_id());
        assert_eq!(result.message, "Unsupported action: teleport", "{}", adapter.provider_id());
    }
    // Rejected before any vendor call, including Veeam's token exchange.
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn result_serializes_flat() {
    let transport = MockTransport::shared();
    let adapter = sentinelone(&transport, vec![]);

    let result = adapter.notify(&NotifyRequest::action("teleport")).await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"success": false, "message": "Unsupported action: teleport"})
    );
}

#[tokio::test]
async fn adapters_without_credentials_are_inert() {
    let registry = ProviderRegistry::with_builtin();
    let configs = [
        ProviderConfig::new("cw", "connectwise-manage").with_auth("company_id", "acme"),
        ProviderConfig::new("s1", "sentinelone"),
        ProviderConfig::new("veeam", "veeam").with_auth("username", "svc"),
        ProviderConfig::new("itg", "itglue").with_auth("api_key", "   "),
    ];

    for config in configs {
        let adapter = registry.create(config, ProviderContext::default()).unwrap();
        assert!(!adapter.is_enabled(), "{}", adapter.provider_id());
        assert!(adapter.query(&QueryRequest::default()).await.is_empty());
        let result = adapter.notify(&NotifyRequest::action("create")).await;
        assert!(!result.success);
        assert_eq!(result.message, "Client not initialized");
    }
}

#[tokio::test]
async fn vendor_errors_degrade_instead_of_escaping() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Get, "/service/tickets", Reply::Status(503, "maintenance"))
        .on(Method::Get, "/v2/threats", Reply::Status(500, "boom"))
        .on(Method::Get, "/organizations", Reply::Status(429, "slow down"))
        .on(Method::Post, VEEAM_TOKEN_PATH, Reply::Json(json!({"access_token": "t"})))
        .on(Method::Get, "/api/v1/jobs", Reply::Status(502, "bad gateway"));

    for adapter in all_adapters(&transport) {
        assert!(adapter.query(&QueryRequest::default()).await.is_empty());
    }
    assert_eq!(transport.count(Method::Get, "/api/v1/jobs"), 1);
}

#[tokio::test]
async fn failed_action_reports_vendor_error_text() {
    let transport = MockTransport::shared();
    transport.on(
        Method::Post,
        "/v2/agents/actions/disconnect",
        Reply::Status(403, "insufficient permissions"),
    );
    let adapter = sentinelone(&transport, vec![]);

    let result = adapter
        .notify(&NotifyRequest::action("isolate").param("agent_ids", json!(["a1"])))
        .await;
    assert!(!result.success);
    assert!(result.message.starts_with("Error: "));
    assert!(result.message.contains("insufficient permissions"));
}

#[tokio::test]
async fn unknown_query_type_returns_nothing() {
    let transport = MockTransport::shared();
    for adapter in all_adapters(&transport) {
        assert!(adapter.query(&QueryRequest::of_type("invoices")).await.is_empty());
    }
    assert_eq!(transport.total(), 0);
}
