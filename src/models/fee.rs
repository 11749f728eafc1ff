use crate::{
    config::ChainProfile,
    constants::{GAS_PRICE_DISPLAY_DIGITS, GWEI_DECIMALS, NATIVE_FEE_DISPLAY_DIGITS, WEI_DECIMALS},
    models::{ChainIdentity, Erc20Estimate, FeeAmount, FeePayload, GasPriceView},
    utils::{format_units_half_up, scale_round_half_up},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of running a fee model against a chain node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeComputation {
    /// Effective gas price in wei.
    pub gas_price_wei: u128,
    /// Gas units consumed by the reference native transfer.
    pub gas_used: u64,
    /// L1 data publication fee, only for chains that charge one.
    pub l1_fee_wei: Option<u128>,
    /// `gas_price_wei * gas_used + l1_fee_wei`.
    pub native_fee_wei: u128,
    /// Sub-strategy that produced the numbers, e.g. `l1:eip1559`.
    pub mode: String,
    /// Which calls succeeded and which fallbacks were taken.
    pub notes: String,
}

impl FeeComputation {
    pub fn new(
        gas_price_wei: u128,
        gas_used: u64,
        l1_fee_wei: Option<u128>,
        mode: impl Into<String>,
        notes: &[String],
    ) -> Self {
        let execution_fee = gas_price_wei.saturating_mul(u128::from(gas_used));
        Self {
            gas_price_wei,
            gas_used,
            l1_fee_wei,
            native_fee_wei: execution_fee.saturating_add(l1_fee_wei.unwrap_or(0)),
            mode: mode.into(),
            notes: notes.join("; "),
        }
    }

    /// Cost of an ERC-20 transfer with `erc20_gas_limit` gas.
    ///
    /// When an L1 data fee was computed it is pro-rated by the ratio of the
    /// ERC-20 gas limit to the native transfer's gas usage, rounded half-up.
    pub fn erc20_fee_wei(&self, erc20_gas_limit: u64) -> u128 {
        let execution_fee = self
            .gas_price_wei
            .saturating_mul(u128::from(erc20_gas_limit));

        let l1_share = match self.l1_fee_wei {
            Some(l1_fee) if self.gas_used > 0 => {
                scale_round_half_up(l1_fee, erc20_gas_limit, self.gas_used).unwrap_or(u128::MAX)
            }
            _ => 0,
        };

        execution_fee.saturating_add(l1_share)
    }
}

/// A fee computation captured for a chain. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSnapshot {
    pub chain: Arc<ChainProfile>,
    pub computation: FeeComputation,
    pub fetched_at: DateTime<Utc>,
}

impl FeeSnapshot {
    pub fn new(chain: Arc<ChainProfile>, computation: FeeComputation) -> Self {
        Self {
            chain,
            computation,
            fetched_at: Utc::now(),
        }
    }

    /// Renders the snapshot for consumers.
    pub fn as_payload(&self) -> FeePayload {
        let computation = &self.computation;
        let erc20_gas_limit = self.chain.erc20_gas_limit;

        FeePayload {
            chain: ChainIdentity::from(self.chain.as_ref()),
            gas_price: GasPriceView {
                wei: computation.gas_price_wei,
                gwei: format_units_half_up(
                    computation.gas_price_wei,
                    GWEI_DECIMALS,
                    GAS_PRICE_DISPLAY_DIGITS,
                ),
            },
            gas_limit: computation.gas_used,
            native_fee: native_amount(computation.native_fee_wei),
            l1_fee: computation.l1_fee_wei.map(native_amount),
            erc20: Erc20Estimate {
                gas_limit: erc20_gas_limit,
                fee: native_amount(computation.erc20_fee_wei(erc20_gas_limit)),
            },
            fetched_at: self.fetched_at.timestamp(),
            mode: computation.mode.clone(),
            notes: computation.notes.clone(),
            stale: None,
            debug: None,
        }
    }
}

fn native_amount(wei: u128) -> FeeAmount {
    FeeAmount {
        wei,
        formatted: format_units_half_up(wei, WEI_DECIMALS, NATIVE_FEE_DISPLAY_DIGITS),
    }
}
