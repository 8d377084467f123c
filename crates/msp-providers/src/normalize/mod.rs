//! Vendor payload to canonical [`Alert`](msp_core::Alert) mapping.
//!
//! Every function here is pure. Missing vendor fields become placeholders
//! ("Unknown", empty string, default severity/status) instead of errors, so
//! one malformed entity never aborts a whole query.

pub mod connectwise;
pub mod itglue;
pub mod sentinelone;
pub mod veeam;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

pub use connectwise::{TicketStatus, ticket_to_alert};
pub use itglue::flatten_resource;
pub use sentinelone::{ThreatSeverity, threat_to_alert};
pub use veeam::{JobResult, job_to_alert, session_to_alert};

pub const UNKNOWN: &str = "Unknown";

/// Follow a `/`-free path of object keys.
pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .filter(|v| !v.is_null())
}

/// Scalar at `path` rendered as text, or `default`.
pub(crate) fn text(value: &Value, path: &[&str], default: &str) -> String {
    lookup(value, path)
        .and_then(scalar_text)
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Vendor-native id as text; `"unknown"` when absent.
pub(crate) fn native_id(value: &Value) -> String {
    text(value, &["id"], "unknown")
}

/// Boolean at `path` rendered lowercase, `default` when absent.
pub(crate) fn flag(value: &Value, path: &[&str], default: bool) -> String {
    lookup(value, path)
        .and_then(Value::as_bool)
        .unwrap_or(default)
        .to_string()
}

/// Parse a vendor timestamp; falls back to now.
pub(crate) fn timestamp(value: &Value, path: &[&str]) -> DateTime<Utc> {
    lookup(value, path)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Naive timestamps are taken as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
