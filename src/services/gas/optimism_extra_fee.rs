//! L1 data publication fee for OP stack chains.
//!
//! The fee is quoted by the `GasPriceOracle` predeploy: the transaction is
//! RLP-encoded in its legacy, EIP-155 unsigned form and passed to
//! `getL1Fee(bytes)` through `eth_call`.
use crate::{
    constants::OPTIMISM_GAS_PRICE_ORACLE_ADDRESS,
    models::RpcError,
    services::provider::{EvmRpcProvider, RpcTransport},
};
use alloy::{
    consensus::{SignableTransaction, TxLegacy},
    primitives::{Address, Bytes, TxKind, U256},
    rpc::types::{TransactionInput, TransactionRequest},
    sol,
    sol_types::SolCall,
};

sol! {
    function getL1Fee(bytes _data) external view returns (uint256);
}

/// Transaction whose L1 publication cost is being quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1FeeRequest {
    pub chain_id: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub input: Bytes,
}

impl L1FeeRequest {
    /// RLP of `[nonce=0, gas_price, gas_limit, to, value, input, chain_id, 0, 0]`.
    pub fn rlp_encoded(&self) -> Bytes {
        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: 0,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: U256::from(self.value),
            input: self.input.clone(),
        };
        Bytes::from(tx.encoded_for_signing())
    }

    /// ABI-encoded `getL1Fee(bytes)` call carrying the RLP payload.
    pub fn oracle_calldata(&self) -> Bytes {
        let call = getL1FeeCall {
            _data: self.rlp_encoded(),
        };
        Bytes::from(call.abi_encode())
    }
}

#[derive(Debug)]
pub struct OptimismExtraFeeService<'a, T: ?Sized> {
    provider: EvmRpcProvider<'a, T>,
    oracle_address: Address,
}

impl<'a, T: RpcTransport + ?Sized> OptimismExtraFeeService<'a, T> {
    pub fn new(provider: EvmRpcProvider<'a, T>) -> Self {
        Self {
            provider,
            oracle_address: OPTIMISM_GAS_PRICE_ORACLE_ADDRESS,
        }
    }

    fn create_contract_call(&self, calldata: Bytes) -> TransactionRequest {
        TransactionRequest {
            to: Some(TxKind::Call(self.oracle_address)),
            input: TransactionInput::from(calldata),
            ..Default::default()
        }
    }

    /// Asks the oracle for the L1 fee of `request`, in wei.
    pub async fn fetch_l1_fee(&self, request: &L1FeeRequest) -> Result<u128, RpcError> {
        let call = self.create_contract_call(request.oracle_calldata());
        let output = self.provider.call_contract(&call).await?;
        decode_uint256(&output)
    }
}

fn decode_uint256(output: &[u8]) -> Result<u128, RpcError> {
    let word = output.get(..32).ok_or_else(|| {
        RpcError::InvalidResponse(format!(
            "getL1Fee returned {} bytes, expected 32",
            output.len()
        ))
    })?;
    let fee = U256::from_be_slice(word);
    u128::try_from(fee)
        .map_err(|_| RpcError::InvalidResponse(format!("getL1Fee result out of range: {fee}")))
}
