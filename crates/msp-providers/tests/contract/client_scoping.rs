//! Client-scoped queries: direct mappings beat name matching, and an
//! unresolvable client never widens to the whole vendor tenant.

use super::common::*;
use msp_core::ClientRecord;
use msp_providers::{Method, Provider, QueryRequest};
use serde_json::json;

fn sites() -> Reply {
    Reply::Json(json!({"data": {"sites": [
        {"id": "site-a", "name": "Acme Main"},
        {"id": "site-b", "name": "Globex"}
    ]}}))
}

#[tokio::test]
async fn external_id_beats_name_match() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Get, "/v2/sites", sites())
        .on(Method::Get, "/v2/threats", Reply::Json(json!({"data": []})));
    let client = ClientRecord::new("c-1", "Acme").with_external("SentinelOne", "site-z");
    let adapter = sentinelone(&transport, vec![client]);

    adapter.query(&QueryRequest::default().for_client("c-1")).await;

    let sent = transport.request_to(Method::Get, "/v2/threats").unwrap();
    assert_eq!(sent.query_value("siteIds"), Some("site-z"));
    assert_eq!(transport.count(Method::Get, "/v2/sites"), 0);
}

#[tokio::test]
async fn metadata_beats_name_match() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Get, "/v2/sites", sites())
        .on(Method::Get, "/v2/threats", Reply::Json(json!({"data": []})));
    let client = ClientRecord::new("c-1", "Acme").with_metadata(json!({
        "sentinelone_sites": [{"id": "site-m1"}, {"id": "site-m2", "name": "DR"}]
    }));
    let adapter = sentinelone(&transport, vec![client]);

    adapter.query(&QueryRequest::default().for_client("c-1")).await;

    let sent = transport.request_to(Method::Get, "/v2/threats").unwrap();
    assert_eq!(sent.query_value("siteIds"), Some("site-m1,site-m2"));
    assert_eq!(transport.count(Method::Get, "/v2/sites"), 0);
}

#[tokio::test]
async fn name_match_is_the_fallback() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Get, "/v2/sites", sites())
        .on(Method::Get, "/v2/threats", Reply::Json(json!({"data": []})));
    let adapter = sentinelone(&transport, vec![ClientRecord::new("c-1", "acme")]);

    adapter.query(&QueryRequest::default().for_client("c-1")).await;

    let sent = transport.request_to(Method::Get, "/v2/threats").unwrap();
    assert_eq!(sent.query_value("siteIds"), Some("site-a"));
}

#[tokio::test]
async fn unresolvable_clients_fail_closed() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Get, "/v2/sites", sites())
        .on(Method::Get, "/company/companies", Reply::Json(json!([])))
        .on(Method::Get, "/organizations", Reply::Json(json!({"data": []})));
    let clients = vec![ClientRecord::new("c-9", "Initech")];

    let s1 = sentinelone(&transport, clients.clone());
    let cw = connectwise(&transport, clients.clone());
    let itg = itglue(&transport, clients);

    let request = QueryRequest::default().for_client("c-9");
    assert!(s1.query(&request).await.is_empty());
    assert!(cw.query(&request).await.is_empty());
    assert!(itg.query(&QueryRequest::of_type("documents").for_client("c-9")).await.is_empty());
    assert!(s1.query(&QueryRequest::default().for_client("missing")).await.is_empty());

    assert_eq!(transport.count(Method::Get, "/v2/threats"), 0);
    assert_eq!(transport.count(Method::Get, "/service/tickets"), 0);
    assert_eq!(transport.count(Method::Get, "/documents"), 0);
}

#[tokio::test]
async fn sentinelone_filter_metadata_does_not_widen_to_tenant() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Get, "/v2/sites", sites())
        .on(Method::Get, "/v2/threats", Reply::Json(json!({"data": [{"id": "t-1"}]})));
    let client = ClientRecord::new("c-1", "Acme").with_metadata(json!({
        "sentinelone_sites": {"site": "site-q"}
    }));
    let adapter = sentinelone(&transport, vec![client]);

    let threats = adapter.query(&QueryRequest::default().for_client("c-1")).await;

    assert!(threats.is_empty());
    assert_eq!(transport.count(Method::Get, "/v2/threats"), 0);
    assert_eq!(transport.count(Method::Get, "/v2/sites"), 0);
}

#[tokio::test]
async fn connectwise_metadata_companies_become_condition() {
    let transport = MockTransport::shared();
    transport.on(Method::Get, "/service/tickets", Reply::Json(json!([])));
    let client = ClientRecord::new("c-1", "Acme").with_metadata(json!({
        "connectwise_companies": [{"id": 19}, {"id": 20}]
    }));
    let adapter = connectwise(&transport, vec![client]);

    adapter.query(&QueryRequest::default().for_client("c-1")).await;

    let sent = transport.request_to(Method::Get, "/service/tickets").unwrap();
    assert_eq!(sent.query_value("conditions"), Some("company/id in [19,20]"));
}
