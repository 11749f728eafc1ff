use clap::Parser;
use gas_fee_engine::{
    config::{load_chains, ConfigFileError, EngineArgs, EngineSettings},
    models::RpcError,
    services::{
        gas::{FeeCache, FeeService},
        pricing::CoinMarketCapClient,
        provider::{EnvEndpointResolver, HttpRpcTransport, RetryPolicy},
        FeeAggregator,
    },
};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

/// Prints current gas fees for the configured chains as JSON.
#[derive(Parser, Debug)]
#[command(name = "gas-fee-engine", version)]
struct Cli {
    /// Request precise mode; honored only when ENABLE_PRECISE_MODE is set
    #[arg(long)]
    precise: bool,
    /// Ignore cached fee snapshots and price quotes
    #[arg(long)]
    refresh: bool,
    /// Fiat currency for native token quotes, e.g. USD
    #[arg(long)]
    currency: Option<String>,

    #[command(flatten)]
    settings: EngineArgs,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] RpcError),
    #[error("logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

fn setup_logging(level: &str) -> Result<(), log::SetLoggerError> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    let config = ConfigBuilder::new()
        .add_filter_allow_str("gas_fee_engine")
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // .env.local first so its values win over .env
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = EngineSettings::from(cli.settings);
    setup_logging(&settings.log_level)?;

    let chains = load_chains(&settings.chains_config_path)?;
    info!(
        "loaded {} chains from {}",
        chains.len(),
        settings.chains_config_path.display()
    );

    let transport = HttpRpcTransport::new(
        settings.http_timeout,
        settings.http_max_connections,
        RetryPolicy::new(settings.rpc_retries, settings.rpc_initial_backoff),
    )?;
    let cache = Arc::new(FeeCache::new(settings.cache_ttl, settings.cache_capacity));
    let service = FeeService::new(
        Arc::new(transport),
        Arc::new(EnvEndpointResolver),
        cache,
        settings.estimate.clone(),
        settings.enable_precise_mode,
    );
    let aggregator = FeeAggregator::new(Arc::new(service), chains);

    let mut report = aggregator.collect(cli.precise, cli.refresh).await;

    if let Some(currency) = cli.currency.as_deref() {
        let pricing = CoinMarketCapClient::new(
            reqwest::Client::new(),
            settings.coinmarketcap_api_url.clone(),
            settings.coinmarketcap_api_key.clone(),
            settings.price_cache_ttl,
        );
        aggregator
            .attach_prices(&mut report, &pricing, currency, cli.refresh)
            .await;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
