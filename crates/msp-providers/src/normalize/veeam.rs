//! Veeam Backup & Replication jobs and sessions.

use msp_core::{Alert, AlertStatus, Severity, Vendor};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{UNKNOWN, flag, lookup, native_id, scalar_text, text, timestamp};

/// Result of a job run or session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResult {
    Success,
    Warning,
    Failed,
    Running,
    Idle,
    Other,
}

impl JobResult {
    pub fn parse(name: &str) -> JobResult {
        match name {
            "Success" => JobResult::Success,
            "Warning" => JobResult::Warning,
            "Failed" => JobResult::Failed,
            "Running" => JobResult::Running,
            "Idle" => JobResult::Idle,
            _ => JobResult::Other,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            JobResult::Warning => Severity::Warning,
            JobResult::Failed => Severity::Critical,
            _ => Severity::Info,
        }
    }

    pub fn alert_status(&self) -> AlertStatus {
        match self {
            JobResult::Success | JobResult::Idle => AlertStatus::Resolved,
            _ => AlertStatus::Firing,
        }
    }
}

// Sessions report either `"result": "Failed"` or `"result": {"result": "Failed", ...}`.
fn result_name(value: &Value, key: &str) -> String {
    match lookup(value, &[key]) {
        Some(Value::Object(inner)) => inner
            .get("result")
            .and_then(scalar_text)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        Some(other) => scalar_text(other).unwrap_or_else(|| UNKNOWN.to_string()),
        None => UNKNOWN.to_string(),
    }
}

pub fn job_to_alert(job: &Value) -> Alert {
    let id = native_id(job);
    let last_result = result_name(job, "lastResult");
    let result = JobResult::parse(&last_result);
    let schedule_enabled = flag(job, &["scheduleEnabled"], false);
    let job_name = text(job, &["name"], UNKNOWN);

    let labels = BTreeMap::from([
        ("job_name".to_string(), job_name),
        ("job_type".to_string(), text(job, &["type"], UNKNOWN)),
        ("schedule_enabled".to_string(), schedule_enabled.clone()),
        ("last_result".to_string(), last_result),
        ("repository".to_string(), text(job, &["repository", "name"], UNKNOWN)),
    ]);

    let annotations = BTreeMap::from([
        ("job_id".to_string(), id.clone()),
        ("schedule_enabled".to_string(), schedule_enabled),
        ("last_run".to_string(), text(job, &["lastRun"], "")),
        ("next_run".to_string(), text(job, &["nextRun"], "")),
    ]);

    Alert {
        fingerprint: Alert::fingerprint_for("veeam-job", &id),
        name: format!("Veeam Job: {}", text(job, &["name"], "Unknown Job")),
        description: text(job, &["description"], ""),
        source: Vendor::Veeam.provider_type().to_string(),
        severity: result.severity(),
        status: result.alert_status(),
        last_received: timestamp(job, &["lastRun"]),
        labels,
        annotations,
        raw: job.clone(),
        id,
    }
}

pub fn session_to_alert(session: &Value) -> Alert {
    let id = native_id(session);
    let result_text = result_name(session, "result");
    let result = JobResult::parse(&result_text);
    let job_name = text(session, &["jobName"], "Unknown Job");

    let labels = BTreeMap::from([
        ("job_name".to_string(), text(session, &["jobName"], UNKNOWN)),
        ("result".to_string(), result_text),
        ("progress".to_string(), text(session, &["progress"], "0")),
        ("is_retry".to_string(), flag(session, &["isRetry"], false)),
    ]);

    let annotations = BTreeMap::from([
        ("session_id".to_string(), id.clone()),
        ("job_id".to_string(), text(session, &["jobId"], "")),
        ("creation_time".to_string(), text(session, &["creationTime"], "")),
        ("end_time".to_string(), text(session, &["endTime"], "")),
    ]);

    Alert {
        fingerprint: Alert::fingerprint_for("veeam-session", &id),
        name: format!("Veeam Session: {job_name}"),
        description: format!("Backup session for job {job_name}"),
        source: Vendor::Veeam.provider_type().to_string(),
        severity: result.severity(),
        status: result.alert_status(),
        last_received: timestamp(session, &["creationTime"]),
        labels,
        annotations,
        raw: session.clone(),
        id,
    }
}
