//! Chain Profile Configuration
//!
//! This module describes the EVM-compatible chains the engine quotes fees for,
//! such as Ethereum, Polygon, Arbitrum, Optimism, Avalanche and Linea.
//!
//! ## Key Features
//!
//! - **Fee model tag**: selects the fee strategy used for the chain
//! - **Lenient tags**: unknown or missing fee model tags fall back to `l1`
//! - **Endpoint hints**: environment variable and shared provider network name

use crate::{
    config::ConfigFileError,
    constants::{DEFAULT_ERC20_GAS_LIMIT, DEFAULT_NATIVE_GAS_LIMIT, MIN_NATIVE_GAS_LIMIT},
};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Chain family fee model.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FeeModel {
    /// Plain EVM chains without a separate data publication fee.
    #[default]
    L1,
    /// OP stack rollups that charge an L1 data fee on top of execution.
    Optimism,
    /// Arbitrum chains, whose gas estimate already carries the L1 buffer.
    Arbitrum,
    /// Linea, which exposes its own gas estimation method.
    Linea,
}

impl<'de> Deserialize<'de> for FeeModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag
            .and_then(|tag| tag.trim().parse().ok())
            .unwrap_or_default())
    }
}

fn default_native_gas_limit() -> u64 {
    DEFAULT_NATIVE_GAS_LIMIT
}

fn default_erc20_gas_limit() -> u64 {
    DEFAULT_ERC20_GAS_LIMIT
}

/// Configuration of a single chain. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainProfile {
    /// Unique identifier of the chain inside this process.
    pub key: String,
    pub display_name: String,
    /// The symbol of the chain's native currency (e.g., "ETH", "POL").
    pub symbol: String,
    /// The EVM chain id.
    pub chain_id: u64,
    #[serde(default)]
    pub fee_model: FeeModel,
    /// Gas limit assumed for a native transfer when estimation is unavailable.
    #[serde(default = "default_native_gas_limit")]
    pub native_gas_limit: u64,
    /// Gas limit used for the derived ERC-20 transfer cost.
    #[serde(default = "default_erc20_gas_limit")]
    pub erc20_gas_limit: u64,
    /// Environment variable holding the chain's RPC URL.
    pub rpc_env: String,
    /// Network name on the shared RPC provider, if it serves this chain.
    #[serde(default)]
    pub infura_network: Option<String>,
    /// Ticker used for fiat quotes when it differs from `symbol`.
    #[serde(default)]
    pub price_symbol: Option<String>,
}

impl ChainProfile {
    /// Validates the chain profile.
    ///
    /// # Returns
    /// - `Ok(())` if the profile is valid
    /// - `Err(ConfigFileError)` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        for (name, value) in [
            ("key", &self.key),
            ("display_name", &self.display_name),
            ("symbol", &self.symbol),
            ("rpc_env", &self.rpc_env),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigFileError::MissingField(format!(
                    "{name} (chain '{}')",
                    self.key
                )));
            }
        }

        if self.native_gas_limit < MIN_NATIVE_GAS_LIMIT {
            return Err(ConfigFileError::InvalidFormat(format!(
                "native_gas_limit for chain '{}' must be at least {}",
                self.key, MIN_NATIVE_GAS_LIMIT
            )));
        }

        if self.erc20_gas_limit < MIN_NATIVE_GAS_LIMIT {
            return Err(ConfigFileError::InvalidFormat(format!(
                "erc20_gas_limit for chain '{}' must be at least {}",
                self.key, MIN_NATIVE_GAS_LIMIT
            )));
        }

        Ok(())
    }

    /// Ticker to use when asking for fiat quotes.
    pub fn price_symbol(&self) -> String {
        self.price_symbol
            .as_deref()
            .filter(|symbol| !symbol.is_empty())
            .unwrap_or(&self.symbol)
            .to_uppercase()
    }
}
