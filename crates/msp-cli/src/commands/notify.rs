//! `msp notify` command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use msp_core::MspConfig;
use msp_providers::NotifyRequest;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::warn;

use super::{build_provider, parse_pair, print_json};

#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// Path to the configuration file
    #[arg(short, long, env = "MSP_CONFIG", default_value = "msp.yaml")]
    pub config: PathBuf,

    /// Provider id from the configuration
    #[arg(short, long)]
    pub provider: String,

    /// Action name, e.g. create_ticket, isolate, start, create
    #[arg(short, long)]
    pub action: Option<String>,

    /// Action parameter as key=value; repeatable
    #[arg(long = "param")]
    pub params: Vec<String>,

    /// Action parameters as one JSON object, merged before --param values
    #[arg(long)]
    pub params_json: Option<String>,
}

impl NotifyArgs {
    fn request(&self) -> Result<NotifyRequest> {
        let mut params = match self.params_json.as_deref() {
            Some(raw) => match serde_json::from_str(raw).context("invalid --params-json")? {
                Value::Object(map) => map,
                _ => bail!("--params-json must be a JSON object"),
            },
            None => Map::new(),
        };
        for raw in &self.params {
            let (key, value) = parse_pair(raw)?;
            params.insert(key, value);
        }
        Ok(NotifyRequest {
            action: self.action.clone(),
            params,
        })
    }
}

/// Prints the action result; a failed action is an error exit.
pub async fn run(args: NotifyArgs, config: MspConfig) -> Result<()> {
    let request = args.request()?;
    let provider = build_provider(&config, &args.provider)?;

    let result = provider.notify(&request).await;
    print_json(&result)?;
    if !result.success {
        warn!(provider = %args.provider, message = %result.message, "action failed");
        bail!("action failed: {}", result.message);
    }
    Ok(())
}
