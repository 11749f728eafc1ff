//! Typed EVM JSON-RPC calls on top of an [`RpcTransport`].
use crate::{config::EstimateSettings, models::RpcError, services::provider::RpcTransport};
use alloy::{
    primitives::{Bytes, TxKind, U128, U256, U64},
    rpc::types::{BlockNumberOrTag, FeeHistory, TransactionRequest},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Base fee of the most recent entry (the pending block).
pub fn latest_base_fee(history: &FeeHistory) -> Option<u128> {
    history.base_fee_per_gas.last().copied()
}

/// First percentile of the most recent block that reported any reward.
pub fn latest_reward(history: &FeeHistory) -> Option<u128> {
    history
        .reward
        .as_deref()
        .unwrap_or_default()
        .iter()
        .rev()
        .find_map(|row| row.first().copied())
}

/// Builds the synthetic native transfer used for gas estimation.
pub fn reference_transaction(estimate: &EstimateSettings) -> TransactionRequest {
    TransactionRequest {
        from: Some(estimate.from),
        to: Some(TxKind::Call(estimate.to)),
        value: Some(U256::from(estimate.value_wei)),
        ..Default::default()
    }
}

/// Chain node client bound to one endpoint.
#[derive(Debug)]
pub struct EvmRpcProvider<'a, T: ?Sized> {
    transport: &'a T,
    url: &'a str,
}

impl<T: ?Sized> Clone for EvmRpcProvider<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for EvmRpcProvider<'_, T> {}

impl<'a, T: RpcTransport + ?Sized> EvmRpcProvider<'a, T> {
    pub fn new(transport: &'a T, url: &'a str) -> Self {
        Self { transport, url }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.transport.call(self.url, method, params).await
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, RpcError> {
        let result = self
            .request("eth_estimateGas", json!([encode_param(tx)?]))
            .await?;
        decode::<U64>("eth_estimateGas", result).map(|gas| gas.to::<u64>())
    }

    /// Linea's estimator returns either a bare quantity or an object with `gasLimit`.
    pub async fn linea_estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, RpcError> {
        let result = self
            .request("linea_estimateGas", json!([encode_param(tx)?]))
            .await?;
        let gas_limit = match result {
            Value::Object(mut fields) => fields.remove("gasLimit").ok_or_else(|| {
                RpcError::InvalidResponse("linea_estimateGas result lacks gasLimit".into())
            })?,
            other => other,
        };
        decode::<U64>("linea_estimateGas", gas_limit).map(|gas| gas.to::<u64>())
    }

    pub async fn fee_history(
        &self,
        block_count: u64,
        reward_percentile: u8,
    ) -> Result<FeeHistory, RpcError> {
        let result = self
            .request(
                "eth_feeHistory",
                json!([U64::from(block_count), BlockNumberOrTag::Latest, [reward_percentile]]),
            )
            .await?;
        decode("eth_feeHistory", result)
    }

    pub async fn max_priority_fee_per_gas(&self) -> Result<u128, RpcError> {
        let result = self.request("eth_maxPriorityFeePerGas", json!([])).await?;
        decode::<U128>("eth_maxPriorityFeePerGas", result).map(|fee| fee.to::<u128>())
    }

    pub async fn gas_price(&self) -> Result<u128, RpcError> {
        let result = self.request("eth_gasPrice", json!([])).await?;
        decode::<U128>("eth_gasPrice", result).map(|price| price.to::<u128>())
    }

    /// Executes a read-only `eth_call` against the latest block.
    pub async fn call_contract(&self, tx: &TransactionRequest) -> Result<Bytes, RpcError> {
        let result = self
            .request(
                "eth_call",
                json!([encode_param(tx)?, BlockNumberOrTag::Latest]),
            )
            .await?;
        decode("eth_call", result)
    }
}

fn encode_param(tx: &TransactionRequest) -> Result<Value, RpcError> {
    serde_json::to_value(tx)
        .map_err(|e| RpcError::InvalidResponse(format!("unencodable transaction: {e}")))
}

fn decode<R: DeserializeOwned>(method: &str, result: Value) -> Result<R, RpcError> {
    serde_json::from_value(result)
        .map_err(|e| RpcError::InvalidResponse(format!("{method} returned unexpected data: {e}")))
}
