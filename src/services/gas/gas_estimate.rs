//! Gas usage estimation for the reference native transfer.
use crate::{
    config::ChainProfile,
    models::RpcError,
    services::provider::{EvmRpcProvider, RpcTransport},
};
use alloy::rpc::types::TransactionRequest;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasUsage {
    pub gas_used: u64,
    pub note: String,
}

/// `eth_estimateGas` with no fallback.
pub async fn estimate_gas<T: RpcTransport + ?Sized>(
    provider: EvmRpcProvider<'_, T>,
    tx: &TransactionRequest,
) -> Result<GasUsage, RpcError> {
    let gas_used = provider.estimate_gas(tx).await?;
    Ok(GasUsage {
        gas_used,
        note: "eth_estimateGas".to_string(),
    })
}

/// `eth_estimateGas`, falling back to the chain's configured gas limit.
pub async fn estimate_gas_or_default<T: RpcTransport + ?Sized>(
    provider: EvmRpcProvider<'_, T>,
    chain: &ChainProfile,
    tx: &TransactionRequest,
) -> GasUsage {
    match estimate_gas(provider, tx).await {
        Ok(usage) => usage,
        Err(err) => {
            debug!(
                "eth_estimateGas failed for {} ({}), using default gas limit",
                chain.key,
                err.class()
            );
            GasUsage {
                gas_used: chain.native_gas_limit,
                note: format!(
                    "fallback:default gas limit {} ({})",
                    chain.native_gas_limit,
                    err.class()
                ),
            }
        }
    }
}

/// `linea_estimateGas`, falling back to the generic estimation path.
pub async fn estimate_linea_gas<T: RpcTransport + ?Sized>(
    provider: EvmRpcProvider<'_, T>,
    chain: &ChainProfile,
    tx: &TransactionRequest,
) -> GasUsage {
    match provider.linea_estimate_gas(tx).await {
        Ok(gas_used) => GasUsage {
            gas_used,
            note: "linea_estimateGas".to_string(),
        },
        Err(err) => {
            let generic = estimate_gas_or_default(provider, chain, tx).await;
            GasUsage {
                gas_used: generic.gas_used,
                note: format!(
                    "linea_estimateGas failed ({}); {}",
                    err.class(),
                    generic.note
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_file::test_utils::create_chain_profile, FeeModel};
    use crate::services::provider::MockRpcTransport;
    use serde_json::json;

    const URL: &str = "https://rpc.test/linea";

    #[tokio::test]
    async fn test_estimate_failure_uses_default_gas_limit() {
        let mut chain = create_chain_profile("polygon", FeeModel::L1);
        chain.native_gas_limit = 30_000;

        let mut transport = MockRpcTransport::new();
        transport
            .expect_call()
            .withf(|_, method, _| method == "eth_estimateGas")
            .times(1)
            .returning(|_, _, _| {
                Err(RpcError::Protocol {
                    code: -32000,
                    message: "insufficient funds".into(),
                })
            });

        let usage =
            estimate_gas_or_default(EvmRpcProvider::new(&transport, URL), &chain, &TransactionRequest::default()).await;
        assert_eq!(usage.gas_used, 30_000);
        assert_eq!(
            usage.note,
            "fallback:default gas limit 30000 (ProtocolError)"
        );
    }

    #[tokio::test]
    async fn test_linea_falls_back_to_generic_estimate() {
        let chain = create_chain_profile("linea", FeeModel::Linea);

        let mut transport = MockRpcTransport::new();
        transport
            .expect_call()
            .withf(|_, method, _| method == "linea_estimateGas")
            .times(1)
            .returning(|_, _, _| {
                Err(RpcError::Http {
                    status: 404,
                    message: "not found".into(),
                })
            });
        transport
            .expect_call()
            .withf(|_, method, _| method == "eth_estimateGas")
            .times(1)
            .returning(|_, _, _| Ok(json!("0x5300")));

        let usage =
            estimate_linea_gas(EvmRpcProvider::new(&transport, URL), &chain, &TransactionRequest::default()).await;
        assert_eq!(usage.gas_used, 0x5300);
        assert_eq!(
            usage.note,
            "linea_estimateGas failed (TransportError); eth_estimateGas"
        );
    }

    #[tokio::test]
    async fn test_strict_estimate_propagates_errors() {
        let mut transport = MockRpcTransport::new();
        transport
            .expect_call()
            .returning(|_, _, _| Err(RpcError::Connection("reset".into())));

        let result = estimate_gas(EvmRpcProvider::new(&transport, URL), &TransactionRequest::default()).await;
        assert_eq!(result, Err(RpcError::Connection("reset".into())));
    }
}
