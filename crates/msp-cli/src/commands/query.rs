//! `msp query` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use msp_core::MspConfig;
use msp_providers::{Condition, QueryRequest};
use std::path::PathBuf;
use tracing::info;

use super::{build_provider, parse_pair, print_json};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Path to the configuration file
    #[arg(short, long, env = "MSP_CONFIG", default_value = "msp.yaml")]
    pub config: PathBuf,

    /// Provider id from the configuration
    #[arg(short, long)]
    pub provider: String,

    /// Resource class, e.g. tickets, threats, jobs, organizations
    #[arg(short = 't', long = "type")]
    pub query_type: Option<String>,

    /// Scope results to one client from the configuration
    #[arg(long)]
    pub client: Option<String>,

    /// IT Glue organization id
    #[arg(long)]
    pub organization: Option<String>,

    /// Filter as key=value; repeatable
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Condition as JSON, e.g. '{"field":"status/name","operator":"not_equals","value":"Closed"}'; repeatable
    #[arg(long = "condition")]
    pub conditions: Vec<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,

    #[arg(long)]
    pub cursor: Option<String>,
}

impl QueryArgs {
    fn request(&self) -> Result<QueryRequest> {
        let mut request = QueryRequest {
            query_type: self.query_type.clone(),
            page: self.page,
            page_size: self.page_size,
            limit: self.limit,
            offset: self.offset,
            cursor: self.cursor.clone(),
            client_id: self.client.clone(),
            organization_id: self.organization.clone(),
            ..QueryRequest::default()
        };
        for raw in &self.filters {
            let (key, value) = parse_pair(raw)?;
            request.filters.insert(key, value);
        }
        for raw in &self.conditions {
            let condition: Condition = serde_json::from_str(raw)
                .with_context(|| format!("invalid condition '{raw}'"))?;
            request.conditions.push(condition);
        }
        Ok(request)
    }
}

pub async fn run(args: QueryArgs, config: MspConfig) -> Result<()> {
    let request = args.request()?;
    let provider = build_provider(&config, &args.provider)?;

    let entities = provider.query(&request).await;
    info!(provider = %args.provider, count = entities.len(), "query finished");
    print_json(&entities)
}
