//! Veeam Backup & Replication adapter.
//!
//! Every call carries a short-lived bearer token obtained through the OAuth2
//! password grant; see [`TokenManager`]. Lists paginate with `limit` and
//! `offset`. Veeam servers commonly run self-signed certificates, so TLS
//! verification is off unless `verify_tls: true` is configured.

use async_trait::async_trait;
use msp_core::{ActionResult, ProviderConfig, Vendor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::conditions::query_param_value;
use crate::directory::ClientDirectory;
use crate::error::{ProviderError, Result};
use crate::normalize::{job_to_alert, session_to_alert};
use crate::provider::{
    Entity, NotifyRequest, Provider, ProviderContext, ProviderDescriptor, ProviderInit,
    QueryRequest, opt_id,
};
use crate::resolver::{ClientResolver, EntityRef, EntityScope, EntitySource};
use crate::token::{API_VERSION, TokenManager};
use crate::transport::{HttpRequest, Transport};
use crate::vendors::{CLIENT_NOT_INITIALIZED, degrade_action, degrade_query, http_transport, log_disabled};

const DEFAULT_LIMIT: u32 = 100;
const AUTH_FAILED: &str = "Failed to authenticate";

pub static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    provider_type: "veeam",
    display_name: "Veeam Backup & Replication",
    categories: &["Backup", "Disaster Recovery"],
    tags: &["msp", "backup", "dr"],
    description: "Veeam Backup & Replication is a backup and disaster recovery solution.",
    fingerprint_fields: &["id", "name"],
    query_types: &["jobs", "sessions", "repositories", "vms", "protected_vms"],
    actions: &["start", "stop", "retry"],
};

/// Typed Veeam settings.
#[derive(Clone)]
pub struct VeeamSettings {
    pub username: String,
    pub password: String,
    pub base_url: String,
    pub verify_tls: bool,
}

impl VeeamSettings {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut missing = config.missing(&["username", "password"]);
        if config.base_url().is_none() {
            missing.push("base_url".to_string());
        }
        if !missing.is_empty() {
            return Err(ProviderError::MissingConfiguration(missing));
        }
        Ok(Self {
            username: config.auth("username").unwrap_or_default().to_string(),
            password: config.auth("password").unwrap_or_default().to_string(),
            base_url: config.base_url().unwrap_or_default().to_string(),
            verify_tls: config.verify_tls.unwrap_or(false),
        })
    }
}

impl fmt::Debug for VeeamSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VeeamSettings")
            .field("username", &self.username)
            .field("base_url", &self.base_url)
            .field("verify_tls", &self.verify_tls)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryType {
    Jobs,
    Sessions,
    Repositories,
    Vms,
    ProtectedVms,
}

impl QueryType {
    fn parse(name: &str) -> Option<QueryType> {
        match name {
            "jobs" => Some(QueryType::Jobs),
            "sessions" => Some(QueryType::Sessions),
            "repositories" => Some(QueryType::Repositories),
            "vms" => Some(QueryType::Vms),
            "protected_vms" => Some(QueryType::ProtectedVms),
            _ => None,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            QueryType::Jobs => "/api/v1/jobs",
            QueryType::Sessions => "/api/v1/sessions",
            QueryType::Repositories => "/api/v1/backupInfrastructure/repositories",
            QueryType::Vms => "/api/v1/inventory/vms",
            QueryType::ProtectedVms => "/api/v1/inventory/protectedVms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobAction {
    Start,
    Stop,
    Retry,
}

impl JobAction {
    fn parse(name: &str) -> Option<JobAction> {
        match name {
            "start" => Some(JobAction::Start),
            "stop" => Some(JobAction::Stop),
            "retry" => Some(JobAction::Retry),
            _ => None,
        }
    }

    fn segment(&self) -> &'static str {
        match self {
            JobAction::Start => "start",
            JobAction::Stop => "stop",
            JobAction::Retry => "retry",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            JobAction::Start => "Job started successfully",
            JobAction::Stop => "Job stopped successfully",
            JobAction::Retry => "Job retry initiated successfully",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct JobParams {
    #[serde(default, deserialize_with = "opt_id")]
    job_id: Option<String>,
}

struct VeeamClient {
    transport: Arc<dyn Transport>,
    tokens: TokenManager,
}

impl VeeamClient {
    fn new(transport: Arc<dyn Transport>, settings: &VeeamSettings) -> Self {
        Self {
            tokens: TokenManager::new(transport.clone(), &settings.username, &settings.password),
            transport,
        }
    }

    /// Send with the current bearer token. A 401 drops the token so the
    /// next call re-authenticates; this call is not retried.
    async fn send(&self, request: HttpRequest, bearer: &str) -> Result<Value> {
        let request = request
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Content-Type", "application/json")
            .header("x-api-version", API_VERSION);
        match self.transport.send(request).await {
            Ok(response) => Ok(response.body),
            Err(e) => {
                if e.is_unauthorized() && self.tokens.invalidate(bearer).await {
                    warn!(error = %e, "veeam rejected bearer token; dropped it");
                }
                Err(e)
            }
        }
    }

    async fn query(
        &self,
        query_type: QueryType,
        request: &QueryRequest,
        client_filters: BTreeMap<String, Value>,
        bearer: &str,
    ) -> Result<Vec<Entity>> {
        let mut filters = request.filters.clone();
        filters.extend(client_filters);

        let mut http = HttpRequest::get(query_type.path())
            .query("limit", request.limit.unwrap_or(DEFAULT_LIMIT))
            .query("offset", request.offset.unwrap_or(0));
        for (key, value) in &filters {
            if let Some(value) = query_param_value(value) {
                http = http.query(key.as_str(), value);
            }
        }

        let body = self.send(http, bearer).await?;
        let items = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(match query_type {
            QueryType::Jobs => items.iter().map(job_to_alert).map(Entity::Alert).collect(),
            QueryType::Sessions => items.iter().map(session_to_alert).map(Entity::Alert).collect(),
            _ => items.into_iter().map(Entity::Record).collect(),
        })
    }

    async fn job_action(&self, action: JobAction, job_id: &str, bearer: &str) -> Result<ActionResult> {
        let path = format!("/api/v1/jobs/{job_id}/{}", action.segment());
        let body = self.send(HttpRequest::post(path), bearer).await?;
        let result = ActionResult::ok(action.success_message());
        Ok(match action {
            JobAction::Start | JobAction::Retry => {
                result.with("task_id", body.get("taskId").cloned().unwrap_or(Value::Null))
            }
            JobAction::Stop => result,
        })
    }
}

#[async_trait]
impl EntitySource for VeeamClient {
    fn vendor(&self) -> Vendor {
        Vendor::Veeam
    }

    async fn list_entities(&self, _client_name: &str) -> Result<Vec<EntityRef>> {
        Ok(Vec::new())
    }

    /// Veeam has no tenant listing; jobs and VMs are narrowed by name.
    async fn heuristic_scope(&self, client: &msp_core::ClientRecord) -> Result<EntityScope> {
        let name = client.name.trim();
        if name.is_empty() {
            return Ok(EntityScope::Filters(BTreeMap::new()));
        }
        Ok(EntityScope::Filters(BTreeMap::from([(
            "name".to_string(),
            Value::String(name.to_string()),
        )])))
    }
}

/// Veeam provider.
pub struct VeeamProvider {
    provider_id: String,
    client: Option<VeeamClient>,
    resolver: ClientResolver,
}

impl VeeamProvider {
    /// Build against an explicit transport.
    pub fn with_transport(
        config: &ProviderConfig,
        directory: Arc<dyn ClientDirectory>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let client = VeeamSettings::from_config(config)
            .map(|settings| VeeamClient::new(transport, &settings));
        Self::build(config.provider_id.clone(), client, directory)
    }

    fn build(provider_id: String, client: Result<VeeamClient>, directory: Arc<dyn ClientDirectory>) -> Self {
        let client = match client {
            Ok(client) => {
                info!(provider = %provider_id, "Veeam client initialized");
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

    /// Filters that scope a query to one client; `None` when the client
    /// cannot be resolved.
    async fn client_filters(&self, client: &VeeamClient, client_id: &str) -> Result<Option<BTreeMap<String, Value>>> {
        let Some(mapping) = self.resolver.resolve(client_id, client).await? else {
            return Ok(None);
        };
        Ok(Some(match mapping.scope {
            EntityScope::Filters(filters) => filters,
            // A stored Veeam id scopes by id.
            EntityScope::Entities(entities) => {
                let ids: Vec<String> = entities.into_iter().map(|e| e.id).collect();
                BTreeMap::from([("id".to_string(), Value::String(ids.join(",")))])
            }
        }))
    }

    async fn scoped_query(&self, client: &VeeamClient, query_type: QueryType, request: &QueryRequest) -> Result<Vec<Entity>> {
        let bearer = match client.tokens.bearer().await {
            Ok(bearer) => bearer,
            Err(e) => {
                error!(provider = %self.provider_id, error = %e, "{AUTH_FAILED}");
                return Ok(Vec::new());
            }
        };

        let mut client_filters = BTreeMap::new();
        if let Some(client_id) = request.client_id.as_deref() {
            match self.client_filters(client, client_id).await? {
                Some(filters) => client_filters = filters,
                None => {
                    warn!(provider = %self.provider_id, client_id, "no Veeam filters for client");
                    return Ok(Vec::new());
                }
            }
        }
        client.query(query_type, request, client_filters, &bearer).await
    }
}

impl ProviderInit for VeeamProvider {
    fn describe() -> &'static ProviderDescriptor {
        &DESCRIPTOR
    }

    fn initialize(config: ProviderConfig, ctx: ProviderContext) -> Self {
        let client = VeeamSettings::from_config(&config).and_then(|settings| {
            let transport = http_transport(&config, &settings.base_url, !settings.verify_tls)?;
            Ok(VeeamClient::new(transport, &settings))
        });
        Self::build(config.provider_id, client, ctx.directory)
    }
}

#[async_trait]
impl Provider for VeeamProvider {
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
        let name = request.query_type_or("jobs");
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
        let params: JobParams = match request.parse_params() {
            Ok(params) => params,
            Err(e) => return ActionResult::failure(format!("Error: invalid parameters: {e}")),
        };
        // Validated before authenticating: a bad request never costs a token exchange.
        let (Some(action), Some(job_id)) = (JobAction::parse(name), params.job_id) else {
            return ActionResult::unsupported(name);
        };

        let bearer = match client.tokens.bearer().await {
            Ok(bearer) => bearer,
            Err(e) => {
                error!(provider = %self.provider_id, error = %e, "{AUTH_FAILED}");
                return ActionResult::failure(AUTH_FAILED);
            }
        };
        degrade_action(&self.provider_id, name, client.job_action(action, &job_id, &bearer).await)
    }
}
