//! SentinelOne endpoint security adapter.
//!
//! Auth is a static `ApiToken` header. Lists paginate with `limit` and an
//! opaque `cursor`; client scoping narrows results to the client's sites.

use async_trait::async_trait;
use msp_core::{ActionResult, ProviderConfig, Vendor};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::conditions::query_param_value;
use crate::directory::ClientDirectory;
use crate::error::{ProviderError, Result};
use crate::normalize::threat_to_alert;
use crate::provider::{
    Entity, NotifyRequest, Provider, ProviderContext, ProviderDescriptor, ProviderInit,
    QueryRequest, id_list, opt_id,
};
use crate::resolver::{ClientResolver, EntityRef, EntitySource};
use crate::transport::{HttpRequest, Transport};
use crate::vendors::{CLIENT_NOT_INITIALIZED, degrade_action, degrade_query, http_transport, log_disabled};

pub const DEFAULT_BASE_URL: &str = "https://usea1-partners.sentinelone.net/api";
const DEFAULT_LIMIT: u32 = 25;

pub static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    provider_type: "sentinelone",
    display_name: "SentinelOne",
    categories: &["Security", "EDR"],
    tags: &["msp", "security", "edr", "xdr"],
    description: "SentinelOne is an endpoint protection platform that uses AI to prevent, detect, and respond to threats.",
    fingerprint_fields: &["id", "threatInfo.threatName"],
    query_types: &["threats", "agents", "activities", "groups", "sites"],
    actions: &[
        "isolate",
        "reconnect",
        "mitigate",
        "get_threat_details",
        "get_endpoint_by_threat_id",
    ],
};

/// Typed SentinelOne settings.
#[derive(Clone)]
pub struct SentinelOneSettings {
    pub api_token: String,
    pub base_url: String,
    pub account_id: Option<String>,
}

impl SentinelOneSettings {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let missing = config.missing(&["api_token"]);
        if !missing.is_empty() {
            return Err(ProviderError::MissingConfiguration(missing));
        }
        Ok(Self {
            api_token: config.auth("api_token").unwrap_or_default().to_string(),
            base_url: config.base_url_or(DEFAULT_BASE_URL).to_string(),
            account_id: config.auth("account_id").map(str::to_string),
        })
    }
}

impl fmt::Debug for SentinelOneSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelOneSettings")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryType {
    Threats,
    Agents,
    Activities,
    Groups,
    Sites,
}

impl QueryType {
    fn parse(name: &str) -> Option<QueryType> {
        match name {
            "threats" => Some(QueryType::Threats),
            "agents" => Some(QueryType::Agents),
            "activities" => Some(QueryType::Activities),
            "groups" => Some(QueryType::Groups),
            "sites" => Some(QueryType::Sites),
            _ => None,
        }
    }

    fn collection(&self) -> &'static str {
        match self {
            QueryType::Threats => "threats",
            QueryType::Agents => "agents",
            QueryType::Activities => "activities",
            QueryType::Groups => "groups",
            QueryType::Sites => "sites",
        }
    }

    fn path(&self) -> String {
        format!("/v2/{}", self.collection())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ActionParams {
    #[serde(default, deserialize_with = "id_list")]
    agent_ids: Vec<String>,
    #[serde(default, deserialize_with = "id_list")]
    threat_ids: Vec<String>,
    #[serde(default, deserialize_with = "opt_id")]
    threat_id: Option<String>,
    #[serde(default)]
    include_timeline: bool,
}

impl ActionParams {
    fn first_threat(&self) -> Option<String> {
        self.threat_id
            .clone()
            .or_else(|| self.threat_ids.first().cloned())
    }

    fn all_threats(&self) -> Vec<String> {
        let mut ids = self.threat_ids.clone();
        if let Some(id) = &self.threat_id
            && !ids.contains(id)
        {
            ids.push(id.clone());
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Isolate(Vec<String>),
    Reconnect(Vec<String>),
    Mitigate(Vec<String>),
    ThreatDetails { threat_id: String, include_timeline: bool },
    EndpointByThreat(String),
}

impl Action {
    /// `None` for unknown actions and for actions missing their ids.
    fn parse(name: &str, params: &ActionParams) -> Option<Action> {
        let agents = (!params.agent_ids.is_empty()).then(|| params.agent_ids.clone());
        match name {
            "isolate" => agents.map(Action::Isolate),
            "reconnect" => agents.map(Action::Reconnect),
            "mitigate" => {
                let threats = params.all_threats();
                (!threats.is_empty()).then_some(Action::Mitigate(threats))
            }
            "get_threat_details" => params.first_threat().map(|threat_id| Action::ThreatDetails {
                threat_id,
                include_timeline: params.include_timeline,
            }),
            "get_endpoint_by_threat_id" => params.first_threat().map(Action::EndpointByThreat),
            _ => None,
        }
    }
}

struct SentinelOneClient {
    transport: Arc<dyn Transport>,
    settings: SentinelOneSettings,
}

impl SentinelOneClient {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        let request = request
            .header("Authorization", format!("ApiToken {}", self.settings.api_token))
            .header("Content-Type", "application/json");
        Ok(self.transport.send(request).await?.body)
    }

    async fn query(&self, query_type: QueryType, request: &QueryRequest, site_ids: &[String]) -> Result<Vec<Entity>> {
        let mut http = HttpRequest::get(query_type.path())
            .query("limit", request.limit.unwrap_or(DEFAULT_LIMIT));
        if let Some(account_id) = &self.settings.account_id {
            http = http.query("accountIds", account_id);
        }
        if !site_ids.is_empty() {
            http = http.query("siteIds", site_ids.join(","));
        }
        if let Some(cursor) = request.cursor.as_deref().filter(|c| !c.is_empty()) {
            http = http.query("cursor", cursor);
        }
        for (key, value) in &request.filters {
            if let Some(value) = query_param_value(value) {
                http = http.query(key.as_str(), value);
            }
        }

        let body = self.send(http).await?;
        let items = collection_items(&body, query_type.collection());
        Ok(match query_type {
            QueryType::Threats => items.iter().map(threat_to_alert).map(Entity::Alert).collect(),
            _ => items.into_iter().map(Entity::Record).collect(),
        })
    }

    async fn agent_action(&self, path: &str, ids: Vec<String>, done: &str, none: &str) -> Result<ActionResult> {
        let body = self.send(HttpRequest::post(path).json(json!({"filter": {"ids": ids}}))).await?;
        Ok(affected_result(body, done, none))
    }

    async fn mitigate(&self, ids: Vec<String>) -> Result<ActionResult> {
        let body = self
            .send(HttpRequest::post("/v2/threats/mitigate").json(json!({
                "filter": {"ids": ids},
                "action": "mitigate"
            })))
            .await?;
        Ok(affected_result(body, "Threats mitigated successfully", "No threats were mitigated"))
    }

    async fn threat(&self, threat_id: &str) -> Result<Value> {
        let body = self.send(HttpRequest::get(format!("/v2/threats/{threat_id}"))).await?;
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn threat_details(&self, threat_id: &str, include_timeline: bool) -> Result<ActionResult> {
        let threat = self.threat(threat_id).await?;
        let info = threat.get("threatInfo").cloned().unwrap_or(Value::Null);

        let timeline = if include_timeline {
            self.timeline(threat_id).await
        } else {
            Vec::new()
        };

        let resolved = threat.get("resolved").and_then(Value::as_bool).unwrap_or(false);
        let mitigated = threat.get("mitigationStatus").and_then(Value::as_str) == Some("mitigated");

        Ok(ActionResult::ok("Threat details retrieved successfully")
            .with("threat_id", threat_id)
            .with("name", field(&info, "threatName"))
            .with("classification", field(&info, "classification"))
            .with("confidence_level", field(&info, "confidenceLevel"))
            .with("severity", field(&info, "severity"))
            .with("status", if resolved { "Resolved" } else { "Active" })
            .with("mitigated", mitigated)
            .with(
                "agent_details",
                json!({
                    "id": field(&threat, "agentId"),
                    "computer_name": field(&threat, "agentComputerName"),
                    "os": field(&threat, "agentOsType"),
                }),
            )
            .with(
                "site",
                json!({"id": field(&threat, "siteId"), "name": field(&threat, "siteName")}),
            )
            .with("indicators", threat.get("indicators").cloned().unwrap_or_else(|| json!([])))
            .with("timeline", Value::Array(timeline))
            .with("created_at", field(&threat, "createdAt"))
            .with("updated_at", field(&threat, "updatedAt"))
            .with("raw_data", threat))
    }

    // Best effort: a failed timeline fetch never fails the details call.
    async fn timeline(&self, threat_id: &str) -> Vec<Value> {
        match self.send(HttpRequest::get(format!("/v2/threats/{threat_id}/timeline"))).await {
            Ok(body) => collection_items(&body, "timeline"),
            Err(e) => {
                warn!(threat_id, error = %e, "failed to fetch threat timeline");
                Vec::new()
            }
        }
    }

    async fn endpoint_by_threat(&self, threat_id: &str) -> Result<ActionResult> {
        let threat = self.threat(threat_id).await?;
        let Some(agent_id) = threat.get("agentId").and_then(crate::resolver::id_string) else {
            return Ok(ActionResult::failure("Agent ID not found for threat"));
        };

        let body = self.send(HttpRequest::get(format!("/v2/agents/{agent_id}"))).await?;
        let agent = body.get("data").cloned().unwrap_or(Value::Null);

        let mac_address = agent
            .get("networkInterfaces")
            .and_then(Value::as_array)
            .and_then(|interfaces| interfaces.first())
            .map(|interface| field(interface, "physical"))
            .unwrap_or(Value::Null);
        let is_isolated = agent.get("isActive").and_then(Value::as_bool).unwrap_or(false)
            && agent.get("networkStatus").and_then(Value::as_str) == Some("disconnected");

        Ok(ActionResult::ok("Endpoint details retrieved successfully")
            .with("endpoint_id", agent_id)
            .with("hostname", field(&agent, "computerName"))
            .with("ip_address", field(&agent, "lastIpToMgmt"))
            .with("mac_address", mac_address)
            .with("os", field(&agent, "osName"))
            .with("version", field(&agent, "agentVersion"))
            .with("last_logged_in_user", field(&agent, "lastLoggedInUserName"))
            .with("is_isolated", is_isolated)
            .with("site_name", field(&agent, "siteName"))
            .with("group_name", field(&agent, "groupName"))
            .with("raw_data", agent))
    }
}

#[async_trait]
impl EntitySource for SentinelOneClient {
    fn vendor(&self) -> Vendor {
        Vendor::SentinelOne
    }

    async fn list_entities(&self, _client_name: &str) -> Result<Vec<EntityRef>> {
        let mut request = HttpRequest::get(QueryType::Sites.path());
        if let Some(account_id) = &self.settings.account_id {
            request = request.query("accountIds", account_id);
        }
        let body = self.send(request).await?;
        Ok(collection_items(&body, "sites")
            .iter()
            .filter_map(|site| {
                let id = crate::resolver::id_string(site.get("id")?)?;
                let name = site.get("name").and_then(Value::as_str).map(str::to_string);
                Some(EntityRef::new(id, name))
            })
            .collect())
    }
}

/// `data` is either the list itself or an object keyed by collection name.
fn collection_items(body: &Value, collection: &str) -> Vec<Value> {
    match body.get("data") {
        Some(Value::Array(items)) => items.clone(),
        Some(data) => data
            .get(collection)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

fn affected_result(body: Value, done: &str, none: &str) -> ActionResult {
    let affected = body
        .get("data")
        .and_then(|data| data.get("affected"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let result = if affected > 0 {
        ActionResult::ok(done)
    } else {
        ActionResult::failure(none)
    };
    result.with("affected", affected).with("result", body)
}

fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

/// SentinelOne provider.
pub struct SentinelOneProvider {
    provider_id: String,
    client: Option<SentinelOneClient>,
    resolver: ClientResolver,
}

impl SentinelOneProvider {
    /// Build against an explicit transport.
    pub fn with_transport(
        config: &ProviderConfig,
        directory: Arc<dyn ClientDirectory>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let client = SentinelOneSettings::from_config(config)
            .map(|settings| SentinelOneClient { transport, settings });
        Self::build(config.provider_id.clone(), client, directory)
    }

    fn build(
        provider_id: String,
        client: Result<SentinelOneClient>,
        directory: Arc<dyn ClientDirectory>,
    ) -> Self {
        let client = match client {
            Ok(client) => {
                info!(provider = %provider_id, "SentinelOne client initialized");
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

    async fn scoped_query(&self, client: &SentinelOneClient, query_type: QueryType, request: &QueryRequest) -> Result<Vec<Entity>> {
        let mut site_ids = Vec::new();
        if let Some(client_id) = request.client_id.as_deref() {
            let Some(mapping) = self.resolver.resolve(client_id, client).await? else {
                warn!(provider = %self.provider_id, client_id, "no SentinelOne sites for client");
                return Ok(Vec::new());
            };
            site_ids = mapping.entity_ids().into_iter().map(str::to_string).collect();
            if site_ids.is_empty() {
                warn!(provider = %self.provider_id, client_id, "client mapping names no site ids");
                return Ok(Vec::new());
            }
        }
        client.query(query_type, request, &site_ids).await
    }
}

impl ProviderInit for SentinelOneProvider {
    fn describe() -> &'static ProviderDescriptor {
        &DESCRIPTOR
    }

    fn initialize(config: ProviderConfig, ctx: ProviderContext) -> Self {
        let client = SentinelOneSettings::from_config(&config).and_then(|settings| {
            let transport = http_transport(&config, &settings.base_url, false)?;
            Ok(SentinelOneClient { transport, settings })
        });
        Self::build(config.provider_id, client, ctx.directory)
    }
}

#[async_trait]
impl Provider for SentinelOneProvider {
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
        let name = request.query_type_or("threats");
        let Some(query_type) = QueryType::parse(name) else {
            error!(provider = %self.provider_id, query_type = name, "unsupported query type");
            return Vec::new();
        };
        degrade_query(&self.provider_id, name, self.scoped_query(client, query_type, request).await)
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
        let params: ActionParams = match request.parse_params() {
            Ok(params) => params,
            Err(e) => return ActionResult::failure(format!("Error: invalid parameters: {e}")),
        };
        let Some(action) = Action::parse(name, &params) else {
            return ActionResult::unsupported(name);
        };

        let result = match action {
            Action::Isolate(ids) => {
                client
                    .agent_action("/v2/agents/actions/disconnect", ids, "Agents isolated successfully", "No agents were isolated")
                    .await
            }
            Action::Reconnect(ids) => {
                client
                    .agent_action("/v2/agents/actions/connect", ids, "Agents reconnected successfully", "No agents were reconnected")
                    .await
            }
            Action::Mitigate(ids) => client.mitigate(ids).await,
            Action::ThreatDetails { threat_id, include_timeline } => {
                client.threat_details(&threat_id, include_timeline).await
            }
            Action::EndpointByThreat(threat_id) => client.endpoint_by_threat(&threat_id).await,
        };
        degrade_action(&self.provider_id, name, result)
    }
}
