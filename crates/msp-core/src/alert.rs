//! Canonical alert record shared by every provider.
//!
//! Vendor payloads (tickets, threats, backup jobs, sessions) are normalized
//! into [`Alert`] so that the alerting host can deduplicate and route them
//! without knowing which vendor produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Alert severity. Vendor values that are not recognized map to [`Severity::Info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    #[default]
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the condition behind an alert is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Firing,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-agnostic alert.
///
/// The JSON shape matches what the alerting host ingests (`lastReceived`
/// in camelCase, everything else snake_case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Vendor-native identifier rendered as a string.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Source tag of the producing provider (e.g. `connectwise-manage`).
    pub source: String,
    pub severity: Severity,
    pub status: AlertStatus,
    /// Last time the vendor reported a change for this entity.
    #[serde(rename = "lastReceived")]
    pub last_received: DateTime<Utc>,
    /// Deterministic identity, `<prefix>-<vendor_native_id>`.
    pub fingerprint: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Untouched vendor payload.
    #[serde(default, alias = "raw_data")]
    pub raw: serde_json::Value,
}

impl Alert {
    /// Build the fingerprint for a vendor entity.
    ///
    /// The prefix is the alert source, optionally qualified by entity kind
    /// (`veeam-job`, `veeam-session`).
    pub fn fingerprint_for(prefix: &str, native_id: &str) -> String {
        format!("{prefix}-{native_id}")
    }

    pub fn is_firing(&self) -> bool {
        self.status == AlertStatus::Firing
    }
}
