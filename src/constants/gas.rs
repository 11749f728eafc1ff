use alloy::primitives::{address, Address};

/// Number of trailing blocks requested from `eth_feeHistory`.
pub const FEE_HISTORY_BLOCKS: u64 = 5;

/// Default reward percentile requested from `eth_feeHistory`.
pub const DEFAULT_REWARD_PERCENTILE: u8 = 50;

/// Optimism gas price oracle predeploy.
pub const OPTIMISM_GAS_PRICE_ORACLE_ADDRESS: Address =
    address!("0x420000000000000000000000000000000000000F");

/// Minimum gas used by a plain value transfer.
pub const MIN_NATIVE_GAS_LIMIT: u64 = 21_000;

pub const DEFAULT_NATIVE_GAS_LIMIT: u64 = 21_000;

/// Typical gas used by an ERC-20 `transfer`.
pub const DEFAULT_ERC20_GAS_LIMIT: u64 = 65_000;

pub const DEFAULT_ESTIMATE_FROM_ADDRESS: &str = "0x000000000000000000000000000000000000dead";
pub const DEFAULT_ESTIMATE_TO_ADDRESS: &str = "0x000000000000000000000000000000000000beef";
pub const DEFAULT_ESTIMATE_VALUE_WEI: u128 = 1;

pub const WEI_DECIMALS: u32 = 18;
pub const GWEI_DECIMALS: u32 = 9;

/// Fraction digits shown for gas prices in gwei.
pub const GAS_PRICE_DISPLAY_DIGITS: u32 = 4;
/// Fraction digits shown for native fee amounts.
pub const NATIVE_FEE_DISPLAY_DIGITS: u32 = 8;

pub const DEFAULT_FEE_CACHE_TTL_SECS: u64 = 60;
pub const MIN_FEE_CACHE_TTL_SECS: u64 = 5;
pub const DEFAULT_FEE_CACHE_CAPACITY: u32 = 64;

pub const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 300;
pub const MIN_PRICE_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_COINMARKETCAP_API_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";
