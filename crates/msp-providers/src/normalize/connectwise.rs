//! ConnectWise Manage tickets.

use msp_core::{Alert, AlertStatus, Severity, Vendor};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{UNKNOWN, native_id, text, timestamp};

/// Ticket status name as reported under `status.name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    New,
    InProgress,
    WaitingCustomer,
    Resolved,
    Closed,
    Other,
}

impl TicketStatus {
    pub fn parse(name: &str) -> TicketStatus {
        match name {
            "New" => TicketStatus::New,
            "In Progress" => TicketStatus::InProgress,
            "Waiting Customer" => TicketStatus::WaitingCustomer,
            "Resolved" => TicketStatus::Resolved,
            "Closed" => TicketStatus::Closed,
            _ => TicketStatus::Other,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            TicketStatus::New => Severity::Critical,
            TicketStatus::InProgress => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn alert_status(&self) -> AlertStatus {
        match self {
            TicketStatus::Resolved | TicketStatus::Closed => AlertStatus::Resolved,
            _ => AlertStatus::Firing,
        }
    }
}

pub fn ticket_to_alert(ticket: &Value) -> Alert {
    let id = native_id(ticket);
    let status_name = text(ticket, &["status", "name"], UNKNOWN);
    let status = TicketStatus::parse(&status_name);
    let source = Vendor::ConnectWise.provider_type();

    let labels = BTreeMap::from([
        ("company".to_string(), text(ticket, &["company", "name"], UNKNOWN)),
        ("board".to_string(), text(ticket, &["board", "name"], UNKNOWN)),
        ("status".to_string(), status_name.clone()),
        ("priority".to_string(), text(ticket, &["priority", "name"], UNKNOWN)),
        ("owner".to_string(), text(ticket, &["owner", "identifier"], "Unassigned")),
    ]);

    let annotations = BTreeMap::from([
        ("ticket_id".to_string(), id.clone()),
        ("company_id".to_string(), text(ticket, &["company", "id"], "")),
        ("board_id".to_string(), text(ticket, &["board", "id"], "")),
        ("status_id".to_string(), text(ticket, &["status", "id"], "")),
        ("priority_id".to_string(), text(ticket, &["priority", "id"], "")),
        ("owner_id".to_string(), text(ticket, &["owner", "id"], "")),
    ]);

    Alert {
        fingerprint: Alert::fingerprint_for(source, &id),
        name: text(ticket, &["summary"], "No summary"),
        description: text(ticket, &["initialDescription"], ""),
        source: source.to_string(),
        severity: status.severity(),
        status: status.alert_status(),
        last_received: timestamp(ticket, &["_info", "lastUpdated"]),
        labels,
        annotations,
        raw: ticket.clone(),
        id,
    }
}
