//! Shared data model for the MSP provider layer.
//!
//! Every vendor adapter speaks in terms of these types: the canonical
//! [`Alert`] produced by queries, the [`ActionResult`] returned by actions,
//! the [`ClientRecord`] used to scope queries to one client, and the YAML
//! configuration that describes which providers exist.

pub mod action;
pub mod alert;
pub mod client;
pub mod config;
pub mod vendor;

pub use action::ActionResult;
pub use alert::{Alert, AlertStatus, Severity};
pub use client::ClientRecord;
pub use config::{ConfigError, MspConfig, ObservabilityConfig, ProviderConfig};
pub use vendor::Vendor;
