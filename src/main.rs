use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use marketplace_search_lib::application::{ErrorResponse, SearchError, SearchPipeline, SearchResponse};
use marketplace_search_lib::domain::{AffiliateTag, SearchQuery};
use marketplace_search_lib::infrastructure::{AppConfig, ConfigManager, init_logging_with_config};

#[derive(Parser, Debug)]
#[command(
    name = "marketplace-search",
    version,
    about = "Search the marketplace and print product listings as JSON"
)]
struct Cli {
    /// Search keyword
    keyword: String,

    /// Configuration file (TOML); defaults to the per-user config directory
    #[arg(long, short, env = "MARKETPLACE_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Affiliate tag written into product links, overriding the config file
    #[arg(long)]
    affiliate_tag: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new()?,
    };
    let config = manager.load_config()?;
    init_logging_with_config(&config.logging)?;

    match search(cli, &config).await {
        Ok(response) => {
            print_json(&response, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            print_json(&ErrorResponse::from(&error), cli.pretty)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn search(cli: &Cli, config: &AppConfig) -> Result<SearchResponse, SearchError> {
    let query = SearchQuery::new(&cli.keyword)?;
    let affiliate = cli
        .affiliate_tag
        .clone()
        .or_else(|| config.affiliate.tag.clone())
        .map(AffiliateTag::new)
        .transpose()?;

    let pipeline = SearchPipeline::from_config(config)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling search");
            interrupt.cancel();
        }
    });

    let result = pipeline.run(&query, &cancel).await?;
    Ok(SearchResponse::new(&query, result, affiliate.as_ref()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    println!("{json}");
    Ok(())
}
