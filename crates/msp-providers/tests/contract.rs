//! Contract tests for the vendor adapters.
//!
//! Every adapter runs against a scripted in-memory transport; nothing here
//! touches the network.
//!
//! Test modules are organized by concern:
//! - `boundary` - unsupported actions, disabled adapters, degraded failures
//! - `normalization` - canonical alert scenarios per vendor
//! - `client_scoping` - resolver precedence through real adapters
//! - `veeam_session` - token reuse, expiry and invalidation
//!
//! Run with:
//!   cargo test -p msp-providers --test contract

#[path = "contract/common/mod.rs"]
mod common;

#[path = "contract/boundary.rs"]
mod boundary;

#[path = "contract/client_scoping.rs"]
mod client_scoping;

#[path = "contract/normalization.rs"]
mod normalization;

#[path = "contract/veeam_session.rs"]
mod veeam_session;
