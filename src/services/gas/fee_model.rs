//! Per-chain fee model strategies.
//!
//! Each [`FeeModel`] variant turns raw node observations into a
//! [`FeeComputation`]:
//!
//! - `l1`: `eth_estimateGas` with a default gas limit fallback, gas price from
//!   fee history with an `eth_gasPrice` fallback.
//! - `arbitrum`: as `l1`, but the estimate is mandatory since it already
//!   carries the L1 calldata buffer.
//! - `optimism`: mandatory estimate, `eth_gasPrice`, plus the L1 data fee from
//!   the gas price oracle.
//! - `linea`: `linea_estimateGas` falling back to the `l1` estimate, `l1` gas
//!   price.
//!
//! Any error that escapes a strategy fails the whole computation.
use crate::{
    config::{ChainProfile, EstimateSettings, FeeModel},
    models::{FeeComputation, RpcError},
    services::{
        gas::{
            estimate_gas, estimate_gas_or_default, estimate_linea_gas,
            l2_fee::l2_fee_service_factory, optimism_extra_fee::L1FeeRequest,
            EvmGasPriceService, GasUsage,
        },
        provider::{reference_transaction, EvmRpcProvider, RpcTransport},
    },
};
use alloy::primitives::Bytes;
use log::{debug, warn};

/// Everything a strategy needs to compute one chain's fee.
#[derive(Debug)]
pub struct FeeContext<'a, T: ?Sized> {
    pub chain: &'a ChainProfile,
    pub provider: EvmRpcProvider<'a, T>,
    pub estimate: &'a EstimateSettings,
}

impl<'a, T: RpcTransport + ?Sized> FeeContext<'a, T> {
    pub fn new(
        chain: &'a ChainProfile,
        provider: EvmRpcProvider<'a, T>,
        estimate: &'a EstimateSettings,
    ) -> Self {
        Self {
            chain,
            provider,
            estimate,
        }
    }

    fn gas_price_service(&self) -> EvmGasPriceService<'a, T> {
        EvmGasPriceService::new(self.provider, self.estimate.reward_percentile)
    }
}

/// Runs the strategy selected by the chain's fee model.
pub async fn compute_fee<T: RpcTransport + ?Sized>(
    ctx: &FeeContext<'_, T>,
) -> Result<FeeComputation, RpcError> {
    debug!(
        "computing fee for {} with {} model",
        ctx.chain.key, ctx.chain.fee_model
    );
    match ctx.chain.fee_model {
        FeeModel::L1 => compute_l1(ctx).await,
        FeeModel::Arbitrum => compute_arbitrum(ctx).await,
        FeeModel::Optimism => compute_optimism(ctx).await,
        FeeModel::Linea => compute_linea(ctx).await,
    }
}

async fn compute_l1<T: RpcTransport + ?Sized>(
    ctx: &FeeContext<'_, T>,
) -> Result<FeeComputation, RpcError> {
    let tx = reference_transaction(ctx.estimate);
    let usage = estimate_gas_or_default(ctx.provider, ctx.chain, &tx).await;
    priced_with_fee_history(ctx, FeeModel::L1, usage).await
}

async fn compute_arbitrum<T: RpcTransport + ?Sized>(
    ctx: &FeeContext<'_, T>,
) -> Result<FeeComputation, RpcError> {
    let tx = reference_transaction(ctx.estimate);
    let usage = estimate_gas(ctx.provider, &tx).await?;
    let usage = GasUsage {
        note: format!("{} (includes L1 buffer)", usage.note),
        ..usage
    };
    priced_with_fee_history(ctx, FeeModel::Arbitrum, usage).await
}

async fn compute_linea<T: RpcTransport + ?Sized>(
    ctx: &FeeContext<'_, T>,
) -> Result<FeeComputation, RpcError> {
    let tx = reference_transaction(ctx.estimate);
    let usage = estimate_linea_gas(ctx.provider, ctx.chain, &tx).await;
    priced_with_fee_history(ctx, FeeModel::Linea, usage).await
}

async fn priced_with_fee_history<T: RpcTransport + ?Sized>(
    ctx: &FeeContext<'_, T>,
    model: FeeModel,
    usage: GasUsage,
) -> Result<FeeComputation, RpcError> {
    let quote = ctx.gas_price_service().resolve().await?;
    Ok(FeeComputation::new(
        quote.gas_price,
        usage.gas_used,
        None,
        format!("{model}:{}", quote.source),
        &[usage.note, quote.note],
    ))
}

async fn compute_optimism<T: RpcTransport + ?Sized>(
    ctx: &FeeContext<'_, T>,
) -> Result<FeeComputation, RpcError> {
    let tx = reference_transaction(ctx.estimate);
    let usage = estimate_gas(ctx.provider, &tx).await?;
    let quote = ctx.gas_price_service().legacy().await?;

    let request = L1FeeRequest {
        chain_id: ctx.chain.chain_id,
        gas_price: quote.gas_price,
        gas_limit: usage.gas_used,
        to: ctx.estimate.to,
        value: ctx.estimate.value_wei,
        input: Bytes::new(),
    };

    let (l1_fee, l1_note) = match l2_fee_service_factory(ctx.chain, ctx.provider) {
        Some(service) => match service.fetch_extra_fee(&request).await {
            Ok(fee) => (fee, "getL1Fee".to_string()),
            Err(err) => {
                warn!(
                    "getL1Fee failed for {} ({}), using zero L1 fee",
                    ctx.chain.key,
                    err.class()
                );
                (0, format!("getL1Fee failed ({}), l1 fee 0", err.class()))
            }
        },
        None => (0, "no L1 fee service".to_string()),
    };

    Ok(FeeComputation::new(
        quote.gas_price,
        usage.gas_used,
        Some(l1_fee),
        "optimism:l2+l1",
        &[usage.note, quote.note, l1_note],
    ))
}
