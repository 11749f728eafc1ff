//! Process settings for the fee engine.
//!
//! Every setting is a command-line flag backed by an environment variable and
//! a default. Values outside their allowed range are rejected by the argument
//! parser rather than clamped.
use crate::constants::{
    DEFAULT_COINMARKETCAP_API_URL, DEFAULT_ESTIMATE_FROM_ADDRESS, DEFAULT_ESTIMATE_TO_ADDRESS,
    DEFAULT_ESTIMATE_VALUE_WEI, DEFAULT_FEE_CACHE_CAPACITY, DEFAULT_FEE_CACHE_TTL_SECS,
    DEFAULT_HTTP_MAX_CONNECTIONS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PRICE_CACHE_TTL_SECS,
    DEFAULT_REWARD_PERCENTILE, DEFAULT_RPC_INITIAL_BACKOFF_MS, DEFAULT_RPC_RETRIES,
    MIN_FEE_CACHE_TTL_SECS, MIN_PRICE_CACHE_TTL_SECS,
};
use alloy::primitives::Address;
use clap::Args;
use std::{path::PathBuf, str::FromStr, time::Duration};

const DEFAULT_CHAINS_CONFIG_PATH: &str = "config/chains.json";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Reference transaction used for gas estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateSettings {
    pub from: Address,
    pub to: Address,
    pub value_wei: u128,
    /// Reward percentile requested from `eth_feeHistory`.
    pub reward_percentile: u8,
}

impl Default for EstimateSettings {
    fn default() -> Self {
        Self {
            from: Address::from_str(DEFAULT_ESTIMATE_FROM_ADDRESS).unwrap_or_default(),
            to: Address::from_str(DEFAULT_ESTIMATE_TO_ADDRESS).unwrap_or_default(),
            value_wei: DEFAULT_ESTIMATE_VALUE_WEI,
            reward_percentile: DEFAULT_REWARD_PERCENTILE,
        }
    }
}

/// Settings flags, each readable from the environment variable of the same name.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    // --- Fee cache --- //
    /// Lifetime of a cached fee snapshot, in seconds
    #[arg(
        long,
        env = "CACHE_TTL_SECONDS",
        default_value_t = DEFAULT_FEE_CACHE_TTL_SECS,
        value_parser = clap::value_parser!(u64).range(MIN_FEE_CACHE_TTL_SECS..)
    )]
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached fee snapshots
    #[arg(
        long,
        env = "CACHE_CAPACITY",
        default_value_t = DEFAULT_FEE_CACHE_CAPACITY,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub cache_capacity: u32,
    /// Serve precise-mode requests; without it `--precise` is ignored
    #[arg(long, env = "ENABLE_PRECISE_MODE")]
    pub enable_precise_mode: bool,

    // --- Chains and RPC --- //
    /// Path of the chain profile file
    #[arg(long, env = "CHAINS_CONFIG_PATH", default_value = DEFAULT_CHAINS_CONFIG_PATH)]
    pub chains_config_path: PathBuf,
    #[arg(
        long,
        env = "HTTP_TIMEOUT_SECONDS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub http_timeout_seconds: u64,
    #[arg(
        long,
        env = "HTTP_MAX_CONNECTIONS",
        default_value_t = DEFAULT_HTTP_MAX_CONNECTIONS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub http_max_connections: u32,
    /// Extra attempts after a transient RPC failure
    #[arg(long, env = "RPC_RETRIES", default_value_t = DEFAULT_RPC_RETRIES)]
    pub rpc_retries: u32,
    /// Delay before the first retry, doubled on each further attempt
    #[arg(long, env = "RPC_INITIAL_BACKOFF_MS", default_value_t = DEFAULT_RPC_INITIAL_BACKOFF_MS)]
    pub rpc_initial_backoff_ms: u64,

    // --- Reference transaction --- //
    #[arg(long, env = "ESTIMATE_FROM_ADDRESS", default_value = DEFAULT_ESTIMATE_FROM_ADDRESS)]
    pub estimate_from_address: Address,
    #[arg(long, env = "ESTIMATE_TO_ADDRESS", default_value = DEFAULT_ESTIMATE_TO_ADDRESS)]
    pub estimate_to_address: Address,
    #[arg(long, env = "ESTIMATE_VALUE_WEI", default_value_t = DEFAULT_ESTIMATE_VALUE_WEI)]
    pub estimate_value_wei: u128,
    #[arg(
        long,
        env = "FEE_HISTORY_REWARD_PERCENTILE",
        default_value_t = DEFAULT_REWARD_PERCENTILE,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub fee_history_reward_percentile: u8,

    // --- Pricing --- //
    /// The CoinMarketCap API key; fiat quotes are unavailable without it
    #[arg(long, env = "COINMARKETCAP_API_KEY", hide_env_values = true)]
    pub coinmarketcap_api_key: Option<String>,
    #[arg(long, env = "COINMARKETCAP_API_URL", default_value = DEFAULT_COINMARKETCAP_API_URL)]
    pub coinmarketcap_api_url: String,
    #[arg(
        long,
        env = "PRICE_CACHE_TTL_SECONDS",
        default_value_t = DEFAULT_PRICE_CACHE_TTL_SECS,
        value_parser = clap::value_parser!(u64).range(MIN_PRICE_CACHE_TTL_SECS..)
    )]
    pub price_cache_ttl_seconds: u64,

    // --- Telemetry --- //
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub chains_config_path: PathBuf,
    pub http_timeout: Duration,
    pub http_max_connections: usize,
    pub enable_precise_mode: bool,
    pub estimate: EstimateSettings,
    pub rpc_retries: u32,
    pub rpc_initial_backoff: Duration,
    pub coinmarketcap_api_key: Option<String>,
    pub coinmarketcap_api_url: String,
    pub price_cache_ttl: Duration,
    pub log_level: String,
}

impl From<EngineArgs> for EngineSettings {
    fn from(args: EngineArgs) -> Self {
        Self {
            cache_ttl: Duration::from_secs(args.cache_ttl_seconds),
            cache_capacity: args.cache_capacity as usize,
            chains_config_path: args.chains_config_path,
            http_timeout: Duration::from_secs(args.http_timeout_seconds),
            http_max_connections: args.http_max_connections as usize,
            enable_precise_mode: args.enable_precise_mode,
            estimate: EstimateSettings {
                from: args.estimate_from_address,
                to: args.estimate_to_address,
                value_wei: args.estimate_value_wei,
                reward_percentile: args.fee_history_reward_percentile,
            },
            rpc_retries: args.rpc_retries,
            rpc_initial_backoff: Duration::from_millis(args.rpc_initial_backoff_ms),
            coinmarketcap_api_key: args
                .coinmarketcap_api_key
                .filter(|key| !key.trim().is_empty()),
            coinmarketcap_api_url: args.coinmarketcap_api_url,
            price_cache_ttl: Duration::from_secs(args.price_cache_ttl_seconds),
            log_level: args.log_level,
        }
    }
}
