//! Client-entity resolution.
//!
//! Maps an internal client id onto the vendor entities that belong to it:
//! ConnectWise companies, SentinelOne sites, IT Glue organizations, or a set
//! of Veeam query filters. Stored identifiers (`direct`) always win over
//! name matching (`heuristic`).

use async_trait::async_trait;
use msp_core::{ClientRecord, Vendor};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::directory::ClientDirectory;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Direct,
    Heuristic,
}

/// A vendor-native entity reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// What a client maps to in one vendor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityScope {
    Entities(Vec<EntityRef>),
    Filters(BTreeMap<String, Value>),
}

impl EntityScope {
    fn is_empty(&self) -> bool {
        match self {
            EntityScope::Entities(entities) => entities.is_empty(),
            EntityScope::Filters(filters) => filters.is_empty(),
        }
    }
}

/// Result of resolving one client against one vendor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientEntityMapping {
    pub client_id: String,
    pub client_name: String,
    pub vendor: Vendor,
    pub scope: EntityScope,
    pub method: ResolutionMethod,
}

impl ClientEntityMapping {
    pub fn entity_ids(&self) -> Vec<&str> {
        match &self.scope {
            EntityScope::Entities(entities) => entities.iter().map(|e| e.id.as_str()).collect(),
            EntityScope::Filters(_) => Vec::new(),
        }
    }

    pub fn filters(&self) -> Option<&BTreeMap<String, Value>> {
        match &self.scope {
            EntityScope::Filters(filters) => Some(filters),
            EntityScope::Entities(_) => None,
        }
    }

    /// More than one candidate entity.
    pub fn is_ambiguous(&self) -> bool {
        self.entity_ids().len() > 1
    }
}

/// Vendor side of the resolver: the vendor's directory-like listing.
#[async_trait]
pub trait EntitySource: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Candidate entities for name matching. May be pre-filtered by name.
    async fn list_entities(&self, client_name: &str) -> Result<Vec<EntityRef>>;

    /// Scope derived without stored identifiers.
    ///
    /// Defaults to every listed entity whose name contains the client name,
    /// case-insensitively.
    async fn heuristic_scope(&self, client: &ClientRecord) -> Result<EntityScope> {
        let candidates = self.list_entities(&client.name).await?;
        Ok(EntityScope::Entities(match_by_name(&client.name, candidates)))
    }
}

/// Keep the entities whose name contains `client_name`, ignoring case.
pub fn match_by_name(client_name: &str, candidates: Vec<EntityRef>) -> Vec<EntityRef> {
    let needle = client_name.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    candidates
        .into_iter()
        .filter(|entity| {
            entity
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Resolves clients through a [`ClientDirectory`].
#[derive(Clone)]
pub struct ClientResolver {
    directory: Arc<dyn ClientDirectory>,
}

impl ClientResolver {
    pub fn new(directory: Arc<dyn ClientDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve `client_id` for the vendor behind `source`.
    ///
    /// Returns `Ok(None)` when the client is unknown or nothing matched.
    pub async fn resolve(
        &self,
        client_id: &str,
        source: &dyn EntitySource,
    ) -> Result<Option<ClientEntityMapping>> {
        let vendor = source.vendor();
        let Some(client) = self.directory.get_client(client_id).await? else {
            warn!(client_id, %vendor, "client not found");
            return Ok(None);
        };

        let mapping = |scope, method| ClientEntityMapping {
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            vendor,
            scope,
            method,
        };

        if let Some(external_id) = client.external_id_for(vendor) {
            debug!(client_id, %vendor, external_id, "resolved client from external id");
            let entity = EntityRef::new(external_id, Some(client.name.clone()));
            return Ok(Some(mapping(
                EntityScope::Entities(vec![entity]),
                ResolutionMethod::Direct,
            )));
        }

        if let Some(scope) = client.vendor_metadata(vendor).and_then(scope_from_metadata) {
            debug!(client_id, %vendor, "resolved client from metadata");
            return Ok(Some(mapping(scope, ResolutionMethod::Direct)));
        }

        let scope = source.heuristic_scope(&client).await?;
        if scope.is_empty() {
            warn!(client_id, %vendor, client_name = %client.name, "no vendor entities match client");
            return Ok(None);
        }
        debug!(client_id, %vendor, "resolved client by name");
        Ok(Some(mapping(scope, ResolutionMethod::Heuristic)))
    }
}

// Lists become entity references, objects become filters. Unusable
// metadata (empty, or entries without ids) yields `None`.
fn scope_from_metadata(value: &Value) -> Option<EntityScope> {
    let scope = match value {
        Value::Array(items) => EntityScope::Entities(items.iter().filter_map(entity_from_value).collect()),
        Value::Object(map) => EntityScope::Filters(filters_from_object(map)),
        _ => return None,
    };
    (!scope.is_empty()).then_some(scope)
}

fn entity_from_value(value: &Value) -> Option<EntityRef> {
    match value {
        Value::Object(map) => {
            let id = id_string(map.get("id")?)?;
            let name = map.get("name").and_then(Value::as_str).map(str::to_string);
            Some(EntityRef::new(id, name))
        }
        other => id_string(other).map(|id| EntityRef::new(id, None)),
    }
}

fn filters_from_object(map: &Map<String, Value>) -> BTreeMap<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Vendor ids arrive as strings or numbers.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
