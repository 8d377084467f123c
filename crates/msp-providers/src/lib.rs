//! # msp-providers
//!
//! Vendor adapters for the MSP operations platform. ConnectWise Manage,
//! SentinelOne, Veeam Backup & Replication and IT Glue sit behind one
//! [`Provider`] contract so the host can query and act on them uniformly.
//!
//! ## Architecture
//!
//! ```text
//!   host (workflows, API)
//!       │  query(QueryRequest) / notify(NotifyRequest)
//!       ▼
//! ┌──────────────────────┐
//! │ ProviderRegistry     │  type tag → constructor
//! └─────────┬────────────┘
//!           ▼
//! ┌──────────────────────┐     ┌────────────────┐
//! │ vendor adapter       │────▶│ ClientResolver │ ← ClientDirectory
//! │  settings + client   │     └────────────────┘
//! │  normalize::*        │
//! └─────────┬────────────┘
//!           │ HttpRequest
//!           ▼
//!     Transport (reqwest)  ──▶ vendor REST API
//! ```
//!
//! Queries never fail at the contract boundary: errors are logged and the
//! caller gets an empty list. Actions always return an
//! [`ActionResult`](msp_core::ActionResult), with `success: false` and the
//! error text when the vendor call failed.
//!
//! ## Example
//!
//! ```ignore
//! use msp_providers::{ProviderContext, ProviderRegistry, QueryRequest};
//!
//! let registry = ProviderRegistry::with_builtin();
//! let provider = registry.create(config, ProviderContext::default())?;
//! let alerts = provider.query(&QueryRequest::of_type("threats")).await;
//! ```

pub mod conditions;
pub mod directory;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod token;
pub mod transport;
pub mod vendors;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use conditions::{Condition, Operator};
pub use directory::{ClientDirectory, InMemoryClientDirectory};
pub use error::{ProviderError, Result};
pub use provider::{
    Entity, NotifyRequest, Provider, ProviderContext, ProviderDescriptor, ProviderInit,
    QueryRequest,
};
pub use registry::ProviderRegistry;
pub use resolver::{ClientEntityMapping, ClientResolver, EntityRef, EntityScope, ResolutionMethod};
pub use token::{TokenManager, TokenPhase};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
pub use vendors::{ConnectWiseProvider, ItGlueProvider, SentinelOneProvider, VeeamProvider};
