//! Rendered per-chain fee payloads.
use crate::config::ChainProfile;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainIdentity {
    pub key: String,
    pub display_name: String,
    pub symbol: String,
    pub chain_id: u64,
}

impl From<&ChainProfile> for ChainIdentity {
    fn from(chain: &ChainProfile) -> Self {
        Self {
            key: chain.key.clone(),
            display_name: chain.display_name.clone(),
            symbol: chain.symbol.clone(),
            chain_id: chain.chain_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasPriceView {
    pub wei: u128,
    pub gwei: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeAmount {
    pub wei: u128,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Erc20Estimate {
    pub gas_limit: u64,
    pub fee: FeeAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeePayload {
    pub chain: ChainIdentity,
    pub gas_price: GasPriceView,
    pub gas_limit: u64,
    pub native_fee: FeeAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l1_fee: Option<FeeAmount>,
    pub erc20: Erc20Estimate,
    /// Unix timestamp (seconds) of the underlying computation.
    pub fetched_at: i64,
    pub mode: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
    /// Sanitized reason the payload is stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainErrorPayload {
    pub chain: ChainIdentity,
    pub error: String,
}

/// Outcome for one chain: a fee (possibly stale) or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChainFeePayload {
    Fee(FeePayload),
    Error(ChainErrorPayload),
}

impl ChainFeePayload {
    pub fn chain(&self) -> &ChainIdentity {
        match self {
            ChainFeePayload::Fee(fee) => &fee.chain,
            ChainFeePayload::Error(err) => &err.chain,
        }
    }

    pub fn fee(&self) -> Option<&FeePayload> {
        match self {
            ChainFeePayload::Fee(fee) => Some(fee),
            ChainFeePayload::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ChainFeePayload::Fee(_) => None,
            ChainFeePayload::Error(err) => Some(&err.error),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.fee().and_then(|fee| fee.stale).unwrap_or(false)
    }
}
