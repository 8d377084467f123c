use anyhow::Context;
use clap::{Parser, Subcommand};
use msp_core::MspConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "msp", version, about = "MSP provider adapter CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in provider catalog.
    Providers {
        /// Print descriptors as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Validate a configuration file and report which adapters would come up.
    Check {
        /// Path to the configuration file
        #[arg(short, long, env = "MSP_CONFIG", default_value = "msp.yaml")]
        config: PathBuf,
    },

    /// Run one query against a configured provider and print the result as JSON.
    Query(commands::query::QueryArgs),

    /// Run one action against a configured provider and print the result as JSON.
    Notify(commands::notify::NotifyArgs),
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<MspConfig> {
    MspConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Providers { json } => {
            init_tracing("info");
            commands::providers::run(json)?;
        }
        Command::Check { config } => {
            let loaded = load_config(&config)?;
            init_tracing(&loaded.observability.log_level);
            commands::check::run(&config, &loaded)?;
        }
        Command::Query(args) => {
            let loaded = load_config(&args.config)?;
            init_tracing(&loaded.observability.log_level);
            commands::query::run(args, loaded).await?;
        }
        Command::Notify(args) => {
            let loaded = load_config(&args.config)?;
            init_tracing(&loaded.observability.log_level);
            commands::notify::run(args, loaded).await?;
        }
    }

    Ok(())
}
