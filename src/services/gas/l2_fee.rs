//! Calculates L2-specific transaction fees.
//!
//! Some layer 2 chains charge for publishing transaction data to L1 on top of
//! the execution fee. This module selects the service that quotes that extra
//! component for a chain, if any.
//!
//! Currently supports:
//! - Optimism: L1 data publication fee from the `GasPriceOracle` predeploy
use crate::{
    config::{ChainProfile, FeeModel},
    models::RpcError,
    services::{
        gas::optimism_extra_fee::{L1FeeRequest, OptimismExtraFeeService},
        provider::{EvmRpcProvider, RpcTransport},
    },
};

#[derive(Debug)]
pub enum L2FeeService<'a, T: ?Sized> {
    Optimism(OptimismExtraFeeService<'a, T>),
}

impl<T: RpcTransport + ?Sized> L2FeeService<'_, T> {
    /// Extra fee in wei charged on top of `gas_price * gas_limit`.
    pub async fn fetch_extra_fee(&self, request: &L1FeeRequest) -> Result<u128, RpcError> {
        match self {
            L2FeeService::Optimism(svc) => svc.fetch_l1_fee(request).await,
        }
    }
}

/// Creates an L2-specific fee service for the given chain.
pub fn l2_fee_service_factory<'a, T: RpcTransport + ?Sized>(
    chain: &ChainProfile,
    provider: EvmRpcProvider<'a, T>,
) -> Option<L2FeeService<'a, T>> {
    match chain.fee_model {
        FeeModel::Optimism => Some(L2FeeService::Optimism(OptimismExtraFeeService::new(
            provider,
        ))),
        FeeModel::L1 | FeeModel::Arbitrum | FeeModel::Linea => None,
    }
}
