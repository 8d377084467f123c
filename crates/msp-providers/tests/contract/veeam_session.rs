//! Veeam bearer token lifecycle observed through the adapter.

use super::common::*;
use msp_providers::{Method, NotifyRequest, Provider, QueryRequest};
use serde_json::json;
use std::time::Duration;

fn token(access_token: &str) -> Reply {
    Reply::Json(json!({"access_token": access_token, "expires_in": 900}))
}

#[tokio::test(start_paused = true)]
async fn calls_within_ttl_share_one_exchange() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Post, VEEAM_TOKEN_PATH, token("first"))
        .on(Method::Get, "/api/v1/jobs", Reply::Json(json!({"data": []})))
        .on(Method::Get, "/api/v1/sessions", Reply::Json(json!({"data": []})));
    let adapter = veeam(&transport, vec![]);

    adapter.query(&QueryRequest::default()).await;
    tokio::time::advance(Duration::from_secs(600)).await;
    adapter.query(&QueryRequest::of_type("sessions")).await;

    assert_eq!(transport.count(Method::Post, VEEAM_TOKEN_PATH), 1);
    let sent = transport.request_to(Method::Get, "/api/v1/sessions").unwrap();
    assert_eq!(sent.header_value("Authorization"), Some("Bearer first"));
    assert_eq!(sent.header_value("x-api-version"), Some("1.0-rev1"));
}

#[tokio::test(start_paused = true)]
async fn call_after_expiry_refreshes_once() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Post, VEEAM_TOKEN_PATH, token("first"))
        .on(Method::Post, VEEAM_TOKEN_PATH, token("second"))
        .on(Method::Get, "/api/v1/jobs", Reply::Json(json!({"data": []})));
    let adapter = veeam(&transport, vec![]);

    adapter.query(&QueryRequest::default()).await;
    tokio::time::advance(Duration::from_secs(901)).await;
    adapter.query(&QueryRequest::default()).await;

    assert_eq!(transport.count(Method::Post, VEEAM_TOKEN_PATH), 2);
    let sent = transport.request_to(Method::Get, "/api/v1/jobs").unwrap();
    assert_eq!(sent.header_value("Authorization"), Some("Bearer second"));
}

#[tokio::test]
async fn rejected_token_is_replaced_on_next_call() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Post, VEEAM_TOKEN_PATH, token("stale"))
        .on(Method::Post, VEEAM_TOKEN_PATH, token("fresh"))
        .on(Method::Post, "/api/v1/jobs/j-7/start", Reply::Status(401, "token revoked"))
        .on(Method::Post, "/api/v1/jobs/j-7/start", Reply::Json(json!({"taskId": "task-1"})));
    let adapter = veeam(&transport, vec![]);
    let start = NotifyRequest::action("start").param("job_id", "j-7");

    let first = adapter.notify(&start).await;
    assert!(!first.success);
    assert!(first.message.contains("401"));

    let second = adapter.notify(&start).await;
    assert!(second.success);
    assert_eq!(second.message, "Job started successfully");
    assert_eq!(second.detail("task_id"), Some(&json!("task-1")));
    assert_eq!(transport.count(Method::Post, VEEAM_TOKEN_PATH), 2);
}

#[tokio::test]
async fn failed_exchange_fails_soft_and_is_retried_lazily() {
    let transport = MockTransport::shared();
    transport
        .on(Method::Post, VEEAM_TOKEN_PATH, Reply::Status(400, "invalid_grant"))
        .on(Method::Post, VEEAM_TOKEN_PATH, token("late"))
        .on(Method::Post, "/api/v1/jobs/j-1/stop", Reply::Json(json!(null)));
    let adapter = veeam(&transport, vec![]);
    let stop = NotifyRequest::action("stop").param("job_id", "j-1");

    let result = adapter.notify(&stop).await;
    assert!(!result.success);
    assert_eq!(result.message, "Failed to authenticate");
    assert_eq!(transport.count(Method::Post, "/api/v1/jobs/j-1/stop"), 0);

    let result = adapter.notify(&stop).await;
    assert!(result.success);
    assert_eq!(result.message, "Job stopped successfully");
}
