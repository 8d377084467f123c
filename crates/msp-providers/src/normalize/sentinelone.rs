//! SentinelOne threats.

use msp_core::{Alert, AlertStatus, Severity, Vendor};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{UNKNOWN, lookup, native_id, text, timestamp};

/// Threat severity as reported under `threatInfo.severity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatSeverity {
    Critical,
    High,
    Medium,
    Low,
    Suspicious,
    Other,
}

impl ThreatSeverity {
    pub fn parse(name: &str) -> ThreatSeverity {
        match name {
            "Critical" => ThreatSeverity::Critical,
            "High" => ThreatSeverity::High,
            "Medium" => ThreatSeverity::Medium,
            "Low" => ThreatSeverity::Low,
            "Suspicious" => ThreatSeverity::Suspicious,
            _ => ThreatSeverity::Other,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ThreatSeverity::Critical => Severity::Critical,
            ThreatSeverity::High | ThreatSeverity::Medium => Severity::Warning,
            ThreatSeverity::Low | ThreatSeverity::Suspicious | ThreatSeverity::Other => {
                Severity::Info
            }
        }
    }
}

/// Only an explicit `resolved: false` keeps a threat firing.
fn threat_status(threat: &Value) -> AlertStatus {
    match lookup(threat, &["resolved"]).and_then(Value::as_bool) {
        Some(false) => AlertStatus::Firing,
        _ => AlertStatus::Resolved,
    }
}

pub fn threat_to_alert(threat: &Value) -> Alert {
    let id = native_id(threat);
    let source = Vendor::SentinelOne.provider_type();
    let severity = ThreatSeverity::parse(&text(threat, &["threatInfo", "severity"], ""));
    let mitigated = lookup(threat, &["mitigationStatus"]).and_then(Value::as_str) == Some("mitigated");

    let labels = BTreeMap::from([
        ("site_name".to_string(), text(threat, &["siteName"], UNKNOWN)),
        ("account_name".to_string(), text(threat, &["accountName"], UNKNOWN)),
        ("computer_name".to_string(), text(threat, &["agentComputerName"], UNKNOWN)),
        ("classification".to_string(), text(threat, &["threatInfo", "classification"], UNKNOWN)),
        ("confidence_level".to_string(), text(threat, &["threatInfo", "confidenceLevel"], UNKNOWN)),
        ("threat_name".to_string(), text(threat, &["threatInfo", "threatName"], UNKNOWN)),
    ]);

    let annotations = BTreeMap::from([
        ("threat_id".to_string(), id.clone()),
        ("agent_id".to_string(), text(threat, &["agentId"], "")),
        ("site_id".to_string(), text(threat, &["siteId"], "")),
        ("account_id".to_string(), text(threat, &["accountId"], "")),
        ("mitigated".to_string(), mitigated.to_string()),
        ("resolved".to_string(), text(threat, &["resolved"], "none")),
    ]);

    Alert {
        fingerprint: Alert::fingerprint_for(source, &id),
        name: text(threat, &["threatInfo", "threatName"], "Unknown Threat"),
        description: text(threat, &["threatInfo", "threatDetails"], ""),
        source: source.to_string(),
        severity: severity.severity(),
        status: threat_status(threat),
        last_received: timestamp(threat, &["createdAt"]),
        labels,
        annotations,
        raw: threat.clone(),
        id,
    }
}
