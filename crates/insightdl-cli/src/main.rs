mod download;
mod lookup;

use anyhow::Context;
use clap::{Parser, Subcommand};
use insightdl_api::{ClientConfig, InsightClient};
use tracing_subscriber::EnvFilter;

use crate::download::DownloadArgs;
use crate::lookup::LookupArgs;

#[derive(Debug, Parser)]
#[command(name = "insightdl")]
#[command(about = "Download insight documents to CSV and look up company or taxonomy ids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export every document matching an insight to four CSV files
    Download(DownloadArgs),
    /// Find company or taxonomy ids by name
    Lookup(LookupArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = insightdl_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = build_client(&config)?;
    match cli.command {
        Commands::Download(args) => download::run_download(&client, &args).await,
        Commands::Lookup(args) => lookup::run_lookup(&client, &args).await,
    }
}

fn build_client(config: &insightdl_core::AppConfig) -> anyhow::Result<InsightClient> {
    let client_config = ClientConfig::new(config.api_token.clone())
        .with_endpoint(config.api_url.clone())
        .with_timeout_secs(config.request_timeout_secs)
        .with_page_size(config.page_size)
        .with_retry_policy(config.max_retries, config.max_retry_wait_secs);
    InsightClient::new(client_config).context("failed to build API client")
}
