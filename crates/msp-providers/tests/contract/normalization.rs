//! Canonical alerts produced end to end, from scripted vendor payloads.

use super::common::*;
use msp_core::{AlertStatus, Severity};
use msp_providers::{Method, Provider, QueryRequest};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn connectwise_new_ticket() {
    let transport = MockTransport::shared();
    transport.on(
        Method::Get,
        "/service/tickets",
        Reply::Json(json!([{
            "id": 5150,
            "summary": "Exchange down",
            "status": {"id": 1, "name": "New"},
            "company": {"id": 250, "name": "Acme"},
            "_info": {"lastUpdated": "2024-03-01T10:00:00Z"}
        }])),
    );
    let adapter = connectwise(&transport, vec![]);

    let entities = adapter.query(&QueryRequest::default()).await;
    let alert = entities[0].as_alert().unwrap();
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.status, AlertStatus::Firing);
    assert_eq!(alert.fingerprint, "connectwise-manage-5150");
    assert_eq!(alert.labels["company"], "Acme");
    assert_eq!(alert.labels["owner"], "Unassigned");
}

#[tokio::test]
async fn veeam_failed_job() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Post, VEEAM_TOKEN_PATH, Reply::Json(json!({"access_token": "t", "expires_in": 900})))
        .on(
            Method::Get,
            "/api/v1/jobs",
            Reply::Json(json!({"data": [{"id": 42, "name": "Nightly", "lastResult": "Failed"}]})),
        );
    let adapter = veeam(&transport, vec![]);

    let entities = adapter.query(&QueryRequest::default()).await;
    let alert = entities[0].as_alert().unwrap();
    assert_eq!(
        (alert.severity, alert.status, alert.fingerprint.as_str()),
        (Severity::Critical, AlertStatus::Firing, "veeam-job-42")
    );
}

#[tokio::test]
async fn sentinelone_suspicious_threat_is_info() {
    let transport = MockTransport::shared();
    transport.on(
        Method::Get,
        "/v2/threats",
        Reply::Json(json!({"data": [{"id": "t-1", "threatInfo": {"severity": "Suspicious"}}]})),
    );
    let adapter = sentinelone(&transport, vec![]);

    let entities = adapter.query(&QueryRequest::default()).await;
    let alert = entities[0].as_alert().unwrap();
    assert_eq!(alert.severity, Severity::Info);
    assert_eq!(alert.fingerprint, "sentinelone-t-1");
}

#[tokio::test]
async fn fingerprints_are_stable_across_queries() {
    let transport = MockTransport::shared();
    transport.on(
        Method::Get,
        "/v2/threats",
        Reply::Json(json!({"data": [
            {"id": "t-1", "threatInfo": {"severity": "Critical"}},
            {"id": "t-2", "threatInfo": {"severity": "Banana"}}
        ]})),
    );
    let adapter = sentinelone(&transport, vec![]);

    let first = adapter.query(&QueryRequest::default()).await;
    let second = adapter.query(&QueryRequest::default()).await;
    let fingerprints = |entities: &[msp_providers::Entity]| -> Vec<String> {
        entities
            .iter()
            .map(|e| e.as_alert().unwrap().fingerprint.clone())
            .collect()
    };
    assert_eq!(fingerprints(&first), fingerprints(&second));
    assert_ne!(fingerprints(&first)[0], fingerprints(&first)[1]);
    // Unrecognised vendor severity falls back to info.
    assert_eq!(first[1].as_alert().unwrap().severity, Severity::Info);
}

#[tokio::test]
async fn itglue_records_stay_records() {
    let transport = MockTransport::shared();
    transport.on(
        Method::Get,
        "/organizations",
        Reply::Json(json!({"data": [{
            "id": "101",
            "type": "organizations",
            "attributes": {"name": "Acme"},
            "relationships": {"parent": {"data": {"id": "1", "type": "organizations"}}}
        }]})),
    );
    let adapter = itglue(&transport, vec![]);

    let entities = adapter.query(&QueryRequest::default()).await;
    assert!(entities[0].as_alert().is_none());
    assert_eq!(
        entities[0].as_record().unwrap(),
        &json!({
            "id": "101",
            "type": "organizations",
            "name": "Acme",
            "relationships": {"parent": {"id": "1", "type": "organizations"}}
        })
    );
}
