//! ConnectWise Manage adapter.
//!
//! Auth is HTTP Basic over `company+public_key:private_key` plus the
//! `ClientID` header of the registered integration. Lists paginate with
//! `page`/`pageSize` and filter through the `conditions` query parameter.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use msp_core::{ActionResult, ProviderConfig, Vendor};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::conditions::{Condition, Operator, connectwise_conditions};
use crate::directory::ClientDirectory;
use crate::error::{ProviderError, Result};
use crate::normalize::ticket_to_alert;
use crate::provider::{
    Entity, NotifyRequest, Provider, ProviderContext, ProviderDescriptor, ProviderInit,
    QueryRequest, opt_id,
};
use crate::resolver::{ClientResolver, EntityRef, EntitySource, id_string};
use crate::transport::{HttpRequest, Transport};
use crate::vendors::{CLIENT_NOT_INITIALIZED, degrade_action, degrade_query, http_transport, log_disabled};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 25;
const COMPANY_LOOKUP_PAGE_SIZE: u32 = 100;

pub static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    provider_type: "connectwise-manage",
    display_name: "ConnectWise Manage",
    categories: &["Ticketing", "PSA"],
    tags: &["msp", "ticketing", "psa"],
    description: "ConnectWise Manage is a business management platform for MSPs.",
    fingerprint_fields: &["id", "summary"],
    query_types: &["tickets", "companies"],
    actions: &["create_ticket", "update_ticket", "add_note"],
};

/// Ticket parameters that become `{ "id": .. }` references, in body order.
const TICKET_REFERENCES: &[(&str, &str)] = &[
    ("board_id", "board"),
    ("company_id", "company"),
    ("status_id", "status"),
    ("priority_id", "priority"),
    ("impact_id", "impact"),
    ("contact_id", "contact"),
    ("owner_id", "owner"),
    ("type_id", "type"),
    ("subtype_id", "subType"),
    ("item_id", "item"),
];

/// Typed ConnectWise settings.
#[derive(Clone)]
pub struct ConnectWiseSettings {
    pub company_id: String,
    pub public_key: String,
    pub private_key: String,
    pub client_id: String,
    pub base_url: String,
}

impl ConnectWiseSettings {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut missing = config.missing(&["company_id", "public_key", "private_key", "client_id"]);
        if config.base_url().is_none() {
            missing.push("base_url".to_string());
        }
        if !missing.is_empty() {
            return Err(ProviderError::MissingConfiguration(missing));
        }
        let value = |key: &str| config.auth(key).unwrap_or_default().to_string();
        Ok(Self {
            company_id: value("company_id"),
            public_key: value("public_key"),
            private_key: value("private_key"),
            client_id: value("client_id"),
            base_url: config.base_url().unwrap_or_default().to_string(),
        })
    }

    /// Value of the `Authorization` header.
    pub fn basic_auth(&self) -> String {
        let credentials = format!("{}+{}:{}", self.company_id, self.public_key, self.private_key);
        format!("Basic {}", BASE64.encode(credentials))
    }
}

impl fmt::Debug for ConnectWiseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectWiseSettings")
            .field("company_id", &self.company_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryType {
    Tickets,
    Companies,
}

impl QueryType {
    fn parse(name: &str) -> Option<QueryType> {
        match name {
            "tickets" => Some(QueryType::Tickets),
            "companies" => Some(QueryType::Companies),
            _ => None,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            QueryType::Tickets => "/service/tickets",
            QueryType::Companies => "/company/companies",
        }
    }

    /// Field a client's company ids are matched against.
    fn company_field(&self) -> &'static str {
        match self {
            QueryType::Tickets => "company/id",
            QueryType::Companies => "id",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TicketParams {
    #[serde(default, deserialize_with = "opt_id")]
    ticket_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    internal: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    CreateTicket,
    UpdateTicket(String),
    AddNote { ticket_id: String, text: String, internal: bool },
}

impl Action {
    /// `None` for unknown actions and for actions missing required fields.
    /// Without an action name, a `ticket_id` means update and its absence
    /// means create.
    fn parse(name: &str, params: &TicketParams) -> Option<Action> {
        let has_summary = params.summary.as_deref().is_some_and(|s| !s.trim().is_empty());
        match name {
            "" => Some(match &params.ticket_id {
                Some(ticket_id) => Action::UpdateTicket(ticket_id.clone()),
                None => Action::CreateTicket,
            }),
            "create_ticket" => has_summary.then_some(Action::CreateTicket),
            "update_ticket" => params.ticket_id.clone().map(Action::UpdateTicket),
            "add_note" => {
                let ticket_id = params.ticket_id.clone()?;
                let text = params.text.clone().filter(|t| !t.trim().is_empty())?;
                Some(Action::AddNote {
                    ticket_id,
                    text,
                    internal: params.internal,
                })
            }
            _ => None,
        }
    }
}

struct ConnectWiseClient {
    transport: Arc<dyn Transport>,
    settings: ConnectWiseSettings,
}

impl ConnectWiseClient {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        debug!(method = %request.method, path = %request.path, "connectwise request");
        let request = request
            .header("Authorization", self.settings.basic_auth())
            .header("ClientID", self.settings.client_id.clone())
            .header("Content-Type", "application/json");
        Ok(self.transport.send(request).await?.body)
    }

    async fn query(&self, query_type: QueryType, request: &QueryRequest, conditions: &[Condition]) -> Result<Vec<Entity>> {
        let mut http = HttpRequest::get(query_type.path())
            .query("page", request.page.unwrap_or(DEFAULT_PAGE))
            .query("pageSize", request.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        if let Some(conditions) = connectwise_conditions(conditions) {
            http = http.query("conditions", conditions);
        }

        let items = match self.send(http).await? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(ProviderError::InvalidResponse(format!(
                    "expected a list from {}, got {other}",
                    query_type.path()
                )));
            }
        };
        Ok(match query_type {
            QueryType::Tickets => items.iter().map(ticket_to_alert).map(Entity::Alert).collect(),
            QueryType::Companies => items.into_iter().map(Entity::Record).collect(),
        })
    }

    async fn create_ticket(&self, params: &TicketParams, raw: &Map<String, Value>) -> Result<ActionResult> {
        let mut ticket = Map::new();
        if let Some(summary) = &params.summary {
            ticket.insert("summary".into(), json!(summary));
        }
        if let Some(description) = &params.description {
            ticket.insert("initialDescription".into(), json!(description));
        }
        ticket.extend(references(raw));

        let created = self.send(HttpRequest::post("/service/tickets").json(Value::Object(ticket))).await?;
        let ticket_id = created.get("id").cloned().unwrap_or(Value::Null);
        Ok(ActionResult::ok("Ticket created successfully")
            .with("ticket", created)
            .with("ticket_id", ticket_id))
    }

    async fn update_ticket(&self, ticket_id: &str, params: &TicketParams, raw: &Map<String, Value>) -> Result<ActionResult> {
        let mut ticket = Map::new();
        if let Some(summary) = &params.summary {
            ticket.insert("summary".into(), json!(summary));
        }
        ticket.extend(references(raw));

        let path = format!("/service/tickets/{ticket_id}");
        let updated = self.send(HttpRequest::patch(path).json(Value::Object(ticket))).await?;
        let ticket_id = updated.get("id").cloned().unwrap_or(Value::Null);
        Ok(ActionResult::ok("Ticket updated successfully")
            .with("ticket", updated)
            .with("ticket_id", ticket_id))
    }

    async fn add_note(&self, ticket_id: &str, text: &str, internal: bool) -> Result<ActionResult> {
        let note = json!({
            "text": text,
            "internalAnalysisFlag": internal,
            "detailDescriptionFlag": false,
            "resolutionFlag": false,
            "externalFlag": !internal,
        });
        let path = format!("/service/tickets/{ticket_id}/notes");
        let created = self.send(HttpRequest::post(path).json(note)).await?;
        Ok(ActionResult::ok("Note added successfully").with("note", created))
    }
}

#[async_trait]
impl EntitySource for ConnectWiseClient {
    fn vendor(&self) -> Vendor {
        Vendor::ConnectWise
    }

    async fn list_entities(&self, client_name: &str) -> Result<Vec<EntityRef>> {
        let name = client_name.trim().replace('\'', "''");
        let conditions = [Condition::new("name", Operator::Contains, name)];
        let mut request = HttpRequest::get(QueryType::Companies.path())
            .query("pageSize", COMPANY_LOOKUP_PAGE_SIZE);
        if let Some(conditions) = connectwise_conditions(&conditions) {
            request = request.query("conditions", conditions);
        }

        let body = self.send(request).await?;
        let companies = body.as_array().cloned().unwrap_or_default();
        Ok(companies
            .iter()
            .filter_map(|company| {
                let id = id_string(company.get("id")?)?;
                let name = company.get("name").and_then(Value::as_str).map(str::to_string);
                Some(EntityRef::new(id, name))
            })
            .collect())
    }
}

// Present, non-null reference parameters as nested `{ "id": .. }` objects.
fn references(raw: &Map<String, Value>) -> Map<String, Value> {
    TICKET_REFERENCES
        .iter()
        .filter_map(|(param, field)| {
            let id = raw.get(*param).filter(|v| !v.is_null())?;
            Some((field.to_string(), json!({ "id": id })))
        })
        .collect()
}

/// Company ids render unquoted when they are numeric.
fn company_id_value(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

fn company_condition(field: &str, ids: &[&str]) -> Condition {
    match ids {
        [id] => Condition::new(field, Operator::Equals, company_id_value(id)),
        _ => Condition::new(
            field,
            Operator::In,
            Value::Array(ids.iter().map(|id| company_id_value(id)).collect()),
        ),
    }
}

/// ConnectWise Manage provider.
pub struct ConnectWiseProvider {
    provider_id: String,
    client: Option<ConnectWiseClient>,
    resolver: ClientResolver,
}

impl ConnectWiseProvider {
    /// Build against an explicit transport.
    pub fn with_transport(
        config: &ProviderConfig,
        directory: Arc<dyn ClientDirectory>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let client = ConnectWiseSettings::from_config(config)
            .map(|settings| ConnectWiseClient { transport, settings });
        Self::build(config.provider_id.clone(), client, directory)
    }

    fn build(
        provider_id: String,
        client: Result<ConnectWiseClient>,
        directory: Arc<dyn ClientDirectory>,
    ) -> Self {
        let client = match client {
            Ok(client) => {
                info!(
                    provider = %provider_id,
                    company_id = %client.settings.company_id,
                    "ConnectWise Manage client initialized"
                );
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

    async fn scoped_query(&self, client: &ConnectWiseClient, query_type: QueryType, request: &QueryRequest) -> Result<Vec<Entity>> {
        let mut conditions = request.conditions.clone();
        if let Some(client_id) = request.client_id.as_deref() {
            let Some(mapping) = self.resolver.resolve(client_id, client).await? else {
                warn!(provider = %self.provider_id, client_id, "no ConnectWise companies for client");
                return Ok(Vec::new());
            };
            let ids = mapping.entity_ids();
            if ids.is_empty() {
                warn!(provider = %self.provider_id, client_id, "client mapping names no company ids");
                return Ok(Vec::new());
            }
            conditions.push(company_condition(query_type.company_field(), &ids));
        }
        client.query(query_type, request, &conditions).await
    }
}

impl ProviderInit for ConnectWiseProvider {
    fn describe() -> &'static ProviderDescriptor {
        &DESCRIPTOR
    }

    fn initialize(config: ProviderConfig, ctx: ProviderContext) -> Self {
        let client = ConnectWiseSettings::from_config(&config).and_then(|settings| {
            let transport = http_transport(&config, &settings.base_url, false)?;
            Ok(ConnectWiseClient { transport, settings })
        });
        Self::build(config.provider_id, client, ctx.directory)
    }
}

#[async_trait]
impl Provider for ConnectWiseProvider {
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
        let name = request.query_type_or("tickets");
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
        let params: TicketParams = match request.parse_params() {
            Ok(params) => params,
            Err(e) => return ActionResult::failure(format!("Error: invalid parameters: {e}")),
        };
        let Some(action) = Action::parse(name, &params) else {
            return ActionResult::unsupported(name);
        };

        let result = match &action {
            Action::CreateTicket => client.create_ticket(&params, &request.params).await,
            Action::UpdateTicket(ticket_id) => client.update_ticket(ticket_id, &params, &request.params).await,
            Action::AddNote { ticket_id, text, internal } => client.add_note(ticket_id, text, *internal).await,
        };
        let label = match action {
            Action::CreateTicket => "create_ticket",
            Action::UpdateTicket(_) => "update_ticket",
            Action::AddNote { .. } => "add_note",
        };
        degrade_action(&self.provider_id, label, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryClientDirectory;
    use crate::test_utils::MockTransport;
    use crate::transport::{Body, Method};
    use msp_core::{AlertStatus, ClientRecord, Severity};
    use pretty_assertions::assert_eq;

    fn config() -> ProviderConfig {
        ProviderConfig::new("cw", "connectwise-manage")
            .with_base_url("https://cw.example.com/v4_6_release/apis/3.0")
            .with_auth("company_id", "acme")
            .with_auth("public_key", "pub")
            .with_auth("private_key", "priv")
            .with_auth("client_id", "integration-1")
    }

    fn provider(transport: &Arc<MockTransport>, clients: Vec<ClientRecord>) -> ConnectWiseProvider {
        ConnectWiseProvider::with_transport(
            &config(),
            Arc::new(InMemoryClientDirectory::new(clients)),
            transport.clone(),
        )
    }

    fn json_body(request: &HttpRequest) -> Value {
        match &request.body {
            Some(Body::Json(body)) => body.clone(),
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn new_ticket_is_critical_and_firing() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            Method::Get,
            "/service/tickets",
            json!([{"id": 1001, "summary": "Server down", "status": {"id": 1, "name": "New"}}]),
        );
        let provider = provider(&transport, vec![]);

        let entities = provider.query(&QueryRequest::default()).await;
        let alert = entities[0].as_alert().unwrap();
        assert_eq!(alert.fingerprint, "connectwise-manage-1001");
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.status, AlertStatus::Firing);

        let request = transport.last_request().unwrap();
        // base64("acme+pub:priv")
        assert_eq!(request.header_value("Authorization"), Some("Basic YWNtZStwdWI6cHJpdg=="));
        assert_eq!(request.header_value("clientid"), Some("integration-1"));
        assert_eq!(request.query_value("page"), Some("1"));
        assert_eq!(request.query_value("pageSize"), Some("25"));
        assert_eq!(request.query_value("conditions"), None);
    }

    #[tokio::test]
    async fn conditions_are_joined_into_one_parameter() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Get, "/service/tickets", json!([]));
        let provider = provider(&transport, vec![]);

        let request = QueryRequest::default()
            .condition(Condition::new("status/name", Operator::NotEquals, "Closed"))
            .condition(Condition::new("closedFlag", Operator::Equals, false))
            .condition(Condition::new("owner", Operator::IsNull, Value::Null));
        provider.query(&request).await;

        let sent = transport.last_request().unwrap();
        assert_eq!(
            sent.query_value("conditions"),
            Some("status/name != 'Closed' AND closedFlag = false AND owner is null")
        );
    }

    #[tokio::test]
    async fn companies_are_records() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Get, "/company/companies", json!([{"id": 5, "name": "Acme"}]));
        let provider = provider(&transport, vec![]);

        let mut request = QueryRequest::of_type("companies");
        request.page = Some(2);
        request.page_size = Some(10);
        let entities = provider.query(&request).await;
        assert_eq!(entities, vec![Entity::Record(json!({"id": 5, "name": "Acme"}))]);

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.query_value("page"), Some("2"));
        assert_eq!(sent.query_value("pageSize"), Some("10"));
    }

    #[tokio::test]
    async fn external_id_scopes_tickets_to_company() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Get, "/service/tickets", json!([]));
        let client = ClientRecord::new("9", "Acme").with_external("connectwise", "250");
        let provider = provider(&transport, vec![client]);

        provider.query(&QueryRequest::default().for_client("9")).await;
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.query_value("conditions"), Some("company/id = 250"));
        assert_eq!(transport.total(), 1);
    }

    #[tokio::test]
    async fn name_match_scopes_to_every_matching_company() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            Method::Get,
            "/company/companies",
            json!([{"id": 1, "name": "Acme Corp"}, {"id": 2, "name": "ACME Labs"}]),
        );
        transport.respond(Method::Get, "/service/tickets", json!([]));
        let provider = provider(&transport, vec![ClientRecord::new("9", "acme")]);

        provider.query(&QueryRequest::default().for_client("9")).await;

        let lookup = transport.request_to(Method::Get, "/company/companies").unwrap();
        assert_eq!(lookup.query_value("conditions"), Some("name contains 'acme'"));
        assert_eq!(lookup.query_value("pageSize"), Some("100"));
        let sent = transport.request_to(Method::Get, "/service/tickets").unwrap();
        assert_eq!(sent.query_value("conditions"), Some("company/id in [1,2]"));
    }

    #[tokio::test]
    async fn unknown_client_yields_nothing() {
        let transport = Arc::new(MockTransport::new());
        let provider = provider(&transport, vec![]);

        assert!(provider.query(&QueryRequest::default().for_client("404")).await.is_empty());
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn creates_ticket_with_references() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Post, "/service/tickets", json!({"id": 77, "summary": "Disk full"}));
        let provider = provider(&transport, vec![]);

        let result = provider
            .notify(
                &NotifyRequest::action("create_ticket")
                    .param("summary", "Disk full")
                    .param("description", "C: at 99%")
                    .param("board_id", 3)
                    .param("company_id", 250)
                    .param("subtype_id", 8),
            )
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Ticket created successfully");
        assert_eq!(result.detail("ticket_id"), Some(&json!(77)));

        let sent = transport.last_request().unwrap();
        assert_eq!(
            json_body(&sent),
            json!({
                "summary": "Disk full",
                "initialDescription": "C: at 99%",
                "board": {"id": 3},
                "company": {"id": 250},
                "subType": {"id": 8}
            })
        );
    }

    #[tokio::test]
    async fn updates_ticket_with_patch() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Patch, "/service/tickets/77", json!({"id": 77}));
        let provider = provider(&transport, vec![]);

        let result = provider
            .notify(
                &NotifyRequest::action("update_ticket")
                    .param("ticket_id", 77)
                    .param("status_id", 5),
            )
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Ticket updated successfully");
        let sent = transport.last_request().unwrap();
        assert_eq!(json_body(&sent), json!({"status": {"id": 5}}));
    }

    #[tokio::test]
    async fn without_action_ticket_id_decides_create_or_update() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Patch, "/service/tickets/12", json!({"id": 12}));
        transport.respond(Method::Post, "/service/tickets", json!({"id": 13}));
        let provider = provider(&transport, vec![]);

        let mut update = NotifyRequest::default();
        update.params.insert("ticket_id".into(), json!("12"));
        assert_eq!(provider.notify(&update).await.message, "Ticket updated successfully");

        let mut create = NotifyRequest::default();
        create.params.insert("summary".into(), json!("Printer jam"));
        assert_eq!(provider.notify(&create).await.message, "Ticket created successfully");
    }

    #[tokio::test]
    async fn internal_note_is_not_external() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Post, "/service/tickets/77/notes", json!({"id": 1}));
        let provider = provider(&transport, vec![]);

        let result = provider
            .notify(
                &NotifyRequest::action("add_note")
                    .param("ticket_id", "77")
                    .param("text", "Rebooted")
                    .param("internal", true),
            )
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Note added successfully");
        assert_eq!(
            json_body(&transport.last_request().unwrap()),
            json!({
                "text": "Rebooted",
                "internalAnalysisFlag": true,
                "detailDescriptionFlag": false,
                "resolutionFlag": false,
                "externalFlag": false
            })
        );
    }

    #[tokio::test]
    async fn incomplete_actions_are_unsupported() {
        let transport = Arc::new(MockTransport::new());
        let provider = provider(&transport, vec![]);

        let result = provider.notify(&NotifyRequest::action("add_note").param("ticket_id", 1)).await;
        assert_eq!(result.message, "Unsupported action: add_note");
        let result = provider.notify(&NotifyRequest::action("create_ticket")).await;
        assert_eq!(result.message, "Unsupported action: create_ticket");
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn vendor_error_fails_the_action() {
        let transport = Arc::new(MockTransport::new());
        transport.fail(Method::Post, "/service/tickets", 400, "board is required");
        let provider = provider(&transport, vec![]);

        let result = provider
            .notify(&NotifyRequest::action("create_ticket").param("summary", "x"))
            .await;
        assert!(!result.success);
        assert!(result.message.starts_with("Error: "));
        assert!(result.message.contains("board is required"));
    }

    #[test]
    fn every_credential_is_required() {
        let config = ProviderConfig::new("cw", "connectwise-manage").with_auth("company_id", "acme");
        let err = ConnectWiseSettings::from_config(&config).unwrap_err();
        let ProviderError::MissingConfiguration(keys) = err else {
            panic!("unexpected error");
        };
        assert_eq!(keys, vec!["public_key", "private_key", "client_id", "base_url"]);
    }

    #[test]
    fn settings_debug_hides_keys() {
        let settings = ConnectWiseSettings::from_config(&config()).unwrap();
        let debug = format!("{settings:?}");
        assert!(debug.contains("acme"));
        assert!(!debug.contains("priv"));
    }
}
