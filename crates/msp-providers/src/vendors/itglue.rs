//! IT Glue documentation adapter.
//!
//! JSON:API over HTTP with an `x-api-key` header. Resources are returned as
//! flattened records rather than alerts.

use async_trait::async_trait;
use msp_core::{ActionResult, ProviderConfig, Vendor};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::conditions::query_param_value;
use crate::directory::ClientDirectory;
use crate::error::{ProviderError, Result};
use crate::normalize::flatten_resource;
use crate::provider::{
    Entity, NotifyRequest, Provider, ProviderContext, ProviderDescriptor, ProviderInit,
    QueryRequest, opt_id,
};
use crate::resolver::{ClientResolver, EntityRef, EntitySource, id_string};
use crate::transport::{HttpRequest, Transport};
use crate::vendors::{
    CLIENT_NOT_INITIALIZED, capitalize, degrade_action, degrade_query, http_transport, log_disabled,
};

pub const DEFAULT_BASE_URL: &str = "https://api.itglue.com";
const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 50;
const JSON_API: &str = "application/vnd.api+json";

pub static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    provider_type: "itglue",
    display_name: "IT Glue",
    categories: &["Documentation", "ITAM"],
    tags: &["msp", "documentation", "itam"],
    description: "IT Glue is a documentation platform for MSPs.",
    fingerprint_fields: &["id", "name"],
    query_types: &["organizations", "configurations", "passwords", "documents", "contacts"],
    actions: &["create", "update"],
};

/// Typed IT Glue settings.
#[derive(Clone)]
pub struct ItGlueSettings {
    pub api_key: String,
    pub base_url: String,
}

impl ItGlueSettings {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let missing = config.missing(&["api_key"]);
        if !missing.is_empty() {
            return Err(ProviderError::MissingConfiguration(missing));
        }
        Ok(Self {
            api_key: config.auth("api_key").unwrap_or_default().to_string(),
            base_url: config.base_url_or(DEFAULT_BASE_URL).to_string(),
        })
    }
}

impl fmt::Debug for ItGlueSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItGlueSettings")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// IT Glue resource collections this adapter reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceType {
    Organizations,
    Configurations,
    Passwords,
    Documents,
    Contacts,
}

impl ResourceType {
    fn parse(name: &str) -> Option<ResourceType> {
        match name {
            "organizations" => Some(ResourceType::Organizations),
            "configurations" => Some(ResourceType::Configurations),
            "passwords" => Some(ResourceType::Passwords),
            "documents" => Some(ResourceType::Documents),
            "contacts" => Some(ResourceType::Contacts),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ResourceType::Organizations => "organizations",
            ResourceType::Configurations => "configurations",
            ResourceType::Passwords => "passwords",
            ResourceType::Documents => "documents",
            ResourceType::Contacts => "contacts",
        }
    }

    fn is_organization_scoped(&self) -> bool {
        !matches!(self, ResourceType::Organizations)
    }

    /// Collection path, nested under the organization for scoped types.
    fn collection_path(&self, organization_id: Option<&str>) -> String {
        match organization_id {
            Some(org) if self.is_organization_scoped() => {
                format!("/organizations/{org}/{}", self.name())
            }
            _ => format!("/{}", self.name()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ResourceParams {
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    resource_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    organization_id: Option<String>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

struct ItGlueClient {
    transport: Arc<dyn Transport>,
    settings: ItGlueSettings,
}

impl ItGlueClient {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        let request = request
            .header("x-api-key", self.settings.api_key.clone())
            .header("Content-Type", JSON_API);
        Ok(self.transport.send(request).await?.body)
    }

    async fn query(&self, resource: ResourceType, request: &QueryRequest, organization_id: Option<&str>) -> Result<Vec<Entity>> {
        let mut http = HttpRequest::get(resource.collection_path(organization_id))
            .query("page[number]", request.page.unwrap_or(DEFAULT_PAGE))
            .query("page[size]", request.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        if resource == ResourceType::Organizations
            && let Some(org) = organization_id
        {
            http = http.query("filter[id]", org);
        }
        for (key, value) in &request.filters {
            if let Some(value) = query_param_value(value) {
                http = http.query(format!("filter[{key}]"), value);
            }
        }

        let body = self.send(http).await?;
        let items = body.get("data").and_then(Value::as_array).cloned().unwrap_or_default();
        Ok(items
            .iter()
            .map(|item| Entity::Record(flatten_resource(item, resource.name())))
            .collect())
    }

    async fn write(&self, request: HttpRequest, resource: ResourceType, verb: &str) -> Result<ActionResult> {
        let body = self.send(request).await?;
        let data = body.get("data").cloned().unwrap_or_else(|| json!({}));
        let resource_id = data.get("id").cloned().unwrap_or(Value::Null);
        Ok(ActionResult::ok(format!("{} {verb} successfully", capitalize(resource.name())))
            .with("resource", flatten_resource(&data, resource.name()))
            .with("resource_id", resource_id))
    }
}

/// JSON:API document wrapping `attributes`.
fn document(resource: ResourceType, attributes: Map<String, Value>) -> Value {
    json!({"data": {"type": resource.name(), "attributes": attributes}})
}

#[async_trait]
impl EntitySource for ItGlueClient {
    fn vendor(&self) -> Vendor {
        Vendor::ItGlue
    }

    async fn list_entities(&self, client_name: &str) -> Result<Vec<EntityRef>> {
        let request = HttpRequest::get("/organizations")
            .query("filter[name]", client_name.trim())
            .query("page[size]", DEFAULT_PAGE_SIZE);
        let body = self.send(request).await?;
        let organizations = body.get("data").and_then(Value::as_array).cloned().unwrap_or_default();
        Ok(organizations
            .iter()
            .filter_map(|org| {
                let id = id_string(org.get("id")?)?;
                let name = org
                    .get("attributes")
                    .and_then(|attributes| attributes.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(EntityRef::new(id, name))
            })
            .collect())
    }
}

/// IT Glue provider.
pub struct ItGlueProvider {
    provider_id: String,
    client: Option<ItGlueClient>,
    resolver: ClientResolver,
}

impl ItGlueProvider {
    /// Build against an explicit transport.
    pub fn with_transport(
        config: &ProviderConfig,
        directory: Arc<dyn ClientDirectory>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let client = ItGlueSettings::from_config(config)
            .map(|settings| ItGlueClient { transport, settings });
        Self::build(config.provider_id.clone(), client, directory)
    }

    fn build(provider_id: String, client: Result<ItGlueClient>, directory: Arc<dyn ClientDirectory>) -> Self {
        let client = match client {
            Ok(client) => {
                info!(provider = %provider_id, "IT Glue client initialized");
                Some(client)
            }
            Err(e) => {
                log_disabled(&provider_id, DESCRIPTOR.provider_type, &e);
                None
            }
        };
        Self {
            provider_id,
            client,
            resolver: ClientResolver::new(directory),
        }
    }

    /// The single organization a client maps to. Ambiguous and unresolved
    /// clients map to none.
    async fn organization_for(&self, client: &ItGlueClient, client_id: &str) -> Result<Option<String>> {
        let Some(mapping) = self.resolver.resolve(client_id, client).await? else {
            warn!(provider = %self.provider_id, client_id, "no IT Glue organization for client");
            return Ok(None);
        };
        if mapping.is_ambiguous() {
            warn!(
                provider = %self.provider_id,
                client_id,
                candidates = ?mapping.entity_ids(),
                "client matches several IT Glue organizations; refusing to pick one"
            );
            return Ok(None);
        }
        Ok(mapping.entity_ids().first().map(|id| id.to_string()))
    }

    async fn scoped_query(&self, client: &ItGlueClient, resource: ResourceType, request: &QueryRequest) -> Result<Vec<Entity>> {
        let mut organization_id = request
            .organization_id
            .clone()
            .filter(|org| !org.trim().is_empty());
        if organization_id.is_none()
            && let Some(client_id) = request.client_id.as_deref()
        {
            match self.organization_for(client, client_id).await? {
                Some(org) => organization_id = Some(org),
                None => return Ok(Vec::new()),
            }
        }
        client.query(resource, request, organization_id.as_deref()).await
    }
}

impl ProviderInit for ItGlueProvider {
    fn describe() -> &'static ProviderDescriptor {
        &DESCRIPTOR
    }

    fn initialize(config: ProviderConfig, ctx: ProviderContext) -> Self {
        let client = ItGlueSettings::from_config(&config).and_then(|settings| {
            let transport = http_transport(&config, &settings.base_url, false)?;
            Ok(ItGlueClient { transport, settings })
        });
        Self::build(config.provider_id, client, ctx.directory)
    }
}

#[async_trait]
impl Provider for ItGlueProvider {
    fn descriptor(&self) -> &'static ProviderDescriptor {
        &DESCRIPTOR
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    async fn query(&self, request: &QueryRequest) -> Vec<Entity> {
        let Some(client) = &self.client else {
            error!(provider = %self.provider_id, "{CLIENT_NOT_INITIALIZED}");
            return Vec::new();
        };
        let name = request.query_type_or("organizations");
        let Some(resource) = ResourceType::parse(name) else {
            error!(provider = %self.provider_id, resource_type = name, "unsupported resource type");
            return Vec::new();
        };
        degrade_query(&self.provider_id, name, self.scoped_query(client, resource, request).await)
    }

    async fn notify(&self, request: &NotifyRequest) -> ActionResult {
        let Some(client) = &self.client else {
            error!(provider = %self.provider_id, "{CLIENT_NOT_INITIALIZED}");
            return ActionResult::failure(CLIENT_NOT_INITIALIZED);
        };
        let name = request.action_name();
        if name.is_empty() {
            return ActionResult::failure("Action is required");
        }
        if !DESCRIPTOR.actions.iter().any(|action| *action == name) {
            return ActionResult::unsupported(name);
        }
        let params: ResourceParams = match request.parse_params() {
            Ok(params) => params,
            Err(e) => return ActionResult::failure(format!("Error: invalid parameters: {e}")),
        };
        let (Some(type_name), Some(data)) = (
            params.resource_type.as_deref(),
            params.data.filter(|data| !data.is_empty()),
        ) else {
            return ActionResult::failure("resource_type and data are required");
        };
        let Some(resource) = ResourceType::parse(type_name) else {
            return ActionResult::failure(format!("Unsupported resource type: {type_name}"));
        };

        let result = match (name, params.resource_id) {
            ("create", _) => {
                let organization_id = params.organization_id.as_deref();
                if resource.is_organization_scoped() && organization_id.is_none() {
                    return ActionResult::failure(format!(
                        "organization_id is required for {}",
                        resource.name()
                    ));
                }
                let http = HttpRequest::post(resource.collection_path(organization_id))
                    .json(document(resource, data));
                client.write(http, resource, "created").await
            }
            ("update", Some(resource_id)) => {
                let http = HttpRequest::patch(format!("/{}/{resource_id}", resource.name()))
                    .json(document(resource, data));
                client.write(http, resource, "updated").await
            }
            _ => return ActionResult::unsupported(name),
        };
        degrade_action(&self.provider_id, name, result)
    }
}
