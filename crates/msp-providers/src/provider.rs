//! The contract every vendor adapter implements.

use async_trait::async_trait;
use msp_core::{ActionResult, Alert, ProviderConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::conditions::Condition;
use crate::directory::{ClientDirectory, InMemoryClientDirectory};

/// Parameters of a `query` call.
///
/// Which fields a vendor honours depends on its pagination style: `page` and
/// `page_size` (ConnectWise, IT Glue), `limit` and `cursor` (SentinelOne),
/// `limit` and `offset` (Veeam). Unset fields take the vendor default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Vendor resource class; the vendor default applies when unset.
    #[serde(default, alias = "resource_type", skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,

    /// Vendor-native filters passed as query parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Value>,

    /// Structured conditions (ConnectWise).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Internal client to scope results to.
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Explicit IT Glue organization; takes precedence over `client_id`.
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

impl QueryRequest {
    pub fn of_type(query_type: impl Into<String>) -> Self {
        Self {
            query_type: Some(query_type.into()),
            ..Self::default()
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn for_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// The requested type, or `default` when unset or blank.
    pub fn query_type_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.query_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(default)
    }
}

/// Parameters of a `notify` call: an `action` discriminator plus the
/// action's companion fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl NotifyRequest {
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            params: Map::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The action name, empty when absent.
    pub fn action_name(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }

    /// Decode the companion fields into an action-specific struct.
    pub fn parse_params<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.params.clone()))
    }
}

/// One item of a query result.
///
/// Alert-shaped resources (tickets, threats, jobs, sessions) come back as
/// [`Entity::Alert`]; ancillary resources as lightly transformed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Alert(Alert),
    Record(Value),
}

impl Entity {
    pub fn as_alert(&self) -> Option<&Alert> {
        match self {
            Entity::Alert(alert) => Some(alert),
            Entity::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Value> {
        match self {
            Entity::Alert(_) => None,
            Entity::Record(value) => Some(value),
        }
    }
}

/// Static registration metadata of a provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub provider_type: &'static str,
    pub display_name: &'static str,
    pub categories: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub description: &'static str,
    pub fingerprint_fields: &'static [&'static str],
    pub query_types: &'static [&'static str],
    pub actions: &'static [&'static str],
}

/// Collaborators handed to every adapter at construction.
#[derive(Clone)]
pub struct ProviderContext {
    pub directory: Arc<dyn ClientDirectory>,
}

impl ProviderContext {
    pub fn new(directory: Arc<dyn ClientDirectory>) -> Self {
        Self { directory }
    }
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self {
            directory: Arc::new(InMemoryClientDirectory::default()),
        }
    }
}

/// A configured vendor adapter.
///
/// `query` and `notify` never fail: transport, parse and auth errors are
/// logged and degrade to an empty list or an unsuccessful [`ActionResult`].
/// A provider constructed without its required configuration is disabled
/// and short-circuits every call the same way.
#[async_trait]
pub trait Provider: Send + Sync {
    fn descriptor(&self) -> &'static ProviderDescriptor;

    fn provider_id(&self) -> &str;

    fn is_enabled(&self) -> bool;

    async fn query(&self, request: &QueryRequest) -> Vec<Entity>;

    async fn notify(&self, request: &NotifyRequest) -> ActionResult;
}

/// Constructor side of the contract, used by the registry.
pub trait ProviderInit: Provider + Sized + 'static {
    fn describe() -> &'static ProviderDescriptor;

    /// Build the adapter. Missing or invalid configuration yields a
    /// disabled adapter rather than an error.
    fn initialize(config: ProviderConfig, ctx: ProviderContext) -> Self;
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserialize a list of identifiers given as strings or numbers.
pub(crate) fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

/// Deserialize an optional identifier given as a string or number.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_or_number(deserializer)?.filter(|s| !s.is_empty()))
}
