//! Effective gas price resolution for EVM chains.
//!
//! The EIP-1559 path reads `eth_feeHistory` over the last few blocks and adds
//! the most recent reward at the configured percentile to the latest base fee.
//! When no reward is reported the priority fee comes from
//! `eth_maxPriorityFeePerGas`. If that path fails the legacy `eth_gasPrice`
//! answer is used instead.
use crate::{
    constants::FEE_HISTORY_BLOCKS,
    models::RpcError,
    services::provider::{latest_base_fee, latest_reward, EvmRpcProvider, RpcTransport},
};
use log::debug;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum GasPriceSource {
    Eip1559,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPriceQuote {
    pub gas_price: u128,
    pub source: GasPriceSource,
    pub note: String,
}

#[derive(Debug)]
pub struct EvmGasPriceService<'a, T: ?Sized> {
    provider: EvmRpcProvider<'a, T>,
    reward_percentile: u8,
}

impl<'a, T: RpcTransport + ?Sized> EvmGasPriceService<'a, T> {
    pub fn new(provider: EvmRpcProvider<'a, T>, reward_percentile: u8) -> Self {
        Self {
            provider,
            reward_percentile,
        }
    }

    /// Resolves the gas price, preferring fee history over `eth_gasPrice`.
    pub async fn resolve(&self) -> Result<GasPriceQuote, RpcError> {
        match self.eip1559_quote().await {
            Ok(quote) => Ok(quote),
            Err(err) => {
                debug!(
                    "fee history unavailable ({}), falling back to eth_gasPrice",
                    err.class()
                );
                let gas_price = self.provider.gas_price().await?;
                Ok(GasPriceQuote {
                    gas_price,
                    source: GasPriceSource::Legacy,
                    note: format!("fallback:eth_gasPrice ({})", err.class()),
                })
            }
        }
    }

    /// Plain `eth_gasPrice`, without consulting fee history.
    pub async fn legacy(&self) -> Result<GasPriceQuote, RpcError> {
        let gas_price = self.provider.gas_price().await?;
        Ok(GasPriceQuote {
            gas_price,
            source: GasPriceSource::Legacy,
            note: "eth_gasPrice".to_string(),
        })
    }

    async fn eip1559_quote(&self) -> Result<GasPriceQuote, RpcError> {
        let history = self
            .provider
            .fee_history(FEE_HISTORY_BLOCKS, self.reward_percentile)
            .await?;
        let base_fee = latest_base_fee(&history).ok_or_else(|| {
            RpcError::InvalidResponse("eth_feeHistory returned no base fee".into())
        })?;

        let (priority_fee, note) = match latest_reward(&history) {
            Some(reward) => (
                reward,
                format!("feeHistory baseFee+p{} reward", self.reward_percentile),
            ),
            None => (
                self.provider.max_priority_fee_per_gas().await?,
                "feeHistory baseFee+eth_maxPriorityFeePerGas".to_string(),
            ),
        };

        Ok(GasPriceQuote {
            gas_price: base_fee.saturating_add(priority_fee),
            source: GasPriceSource::Eip1559,
            note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::MockRpcTransport;
    use serde_json::json;

    const URL: &str = "https://rpc.test/eth";

    fn expect_method(
        transport: &mut MockRpcTransport,
        method: &'static str,
        result: Result<serde_json::Value, RpcError>,
    ) {
        transport
            .expect_call()
            .withf(move |_, m, _| m == method)
            .times(1)
            .returning(move |_, _, _| result.clone());
    }

    #[tokio::test]
    async fn test_fee_history_reward_is_priority_fee() {
        let mut transport = MockRpcTransport::new();
        expect_method(
            &mut transport,
            "eth_feeHistory",
            Ok(json!({
                "oldestBlock": "0x1",
                "gasUsedRatio": [0.5],
                "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
                "reward": [["0x77359400"], []]
            })),
        );

        let service = EvmGasPriceService::new(EvmRpcProvider::new(&transport, URL), 50);
        let quote = service.resolve().await.unwrap();

        assert_eq!(quote.gas_price, 3_000_000_000);
        assert_eq!(quote.source, GasPriceSource::Eip1559);
        assert_eq!(quote.note, "feeHistory baseFee+p50 reward");
    }

    #[tokio::test]
    async fn test_missing_reward_queries_priority_fee() {
        let mut transport = MockRpcTransport::new();
        expect_method(
            &mut transport,
            "eth_feeHistory",
            Ok(json!({
                "oldestBlock": "0x1",
                "gasUsedRatio": [0.5],
                "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"]
            })),
        );
        expect_method(
            &mut transport,
            "eth_maxPriorityFeePerGas",
            Ok(json!("0x77359400")),
        );

        let service = EvmGasPriceService::new(EvmRpcProvider::new(&transport, URL), 50);
        let quote = service.resolve().await.unwrap();

        assert_eq!(quote.gas_price, 3_000_000_000);
        assert_eq!(quote.source, GasPriceSource::Eip1559);
        assert_eq!(quote.note, "feeHistory baseFee+eth_maxPriorityFeePerGas");
    }

    #[tokio::test]
    async fn test_fee_history_failure_falls_back_to_legacy() {
        let mut transport = MockRpcTransport::new();
        expect_method(
            &mut transport,
            "eth_feeHistory",
            Err(RpcError::Protocol {
                code: -32601,
                message: "the method eth_feeHistory does not exist".into(),
            }),
        );
        expect_method(&mut transport, "eth_gasPrice", Ok(json!("0x2540be400")));

        let service = EvmGasPriceService::new(EvmRpcProvider::new(&transport, URL), 50);
        let quote = service.resolve().await.unwrap();

        assert_eq!(quote.gas_price, 10_000_000_000);
        assert_eq!(quote.source, GasPriceSource::Legacy);
        assert_eq!(quote.note, "fallback:eth_gasPrice (ProtocolError)");
        assert_eq!(quote.source.to_string(), "legacy");
    }

    #[tokio::test]
    async fn test_legacy_failure_propagates() {
        let mut transport = MockRpcTransport::new();
        expect_method(
            &mut transport,
            "eth_feeHistory",
            Err(RpcError::Connection("refused".into())),
        );
        expect_method(
            &mut transport,
            "eth_gasPrice",
            Err(RpcError::Connection("refused".into())),
        );

        let service = EvmGasPriceService::new(EvmRpcProvider::new(&transport, URL), 50);
        assert_eq!(
            service.resolve().await,
            Err(RpcError::Connection("refused".into()))
        );
    }
}
