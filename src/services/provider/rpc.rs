//! JSON-RPC 2.0 over HTTP POST.
//!
//! A response carrying a top-level `error` object is a protocol failure and is
//! returned immediately. Connection failures and HTTP 429/5xx gateway statuses
//! are retried according to the transport's [`RetryPolicy`]; any other HTTP
//! status is returned without retry.
use crate::{
    constants::JSONRPC_VERSION,
    models::RpcError,
    services::provider::RetryPolicy,
    utils::redact_url,
};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

/// Sends a single JSON-RPC request to `endpoint` and returns its `result`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[derive(Debug, Clone)]
pub struct HttpRpcTransport {
    client: Client,
    retry: RetryPolicy,
}

impl HttpRpcTransport {
    /// Builds a transport with its own connection pool and per-request timeout.
    pub fn new(
        timeout: Duration,
        max_connections: usize,
        retry: RetryPolicy,
    ) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(max_connections)
            .build()
            .map_err(|e| RpcError::Connection(e.to_string()))?;
        Ok(Self::with_client(client, retry))
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    async fn send_once(
        &self,
        endpoint: &str,
        method: &str,
        params: &Value,
    ) -> Result<Value, RpcError> {
        debug!("rpc {} -> {}", method, redact_url(endpoint));

        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: 1,
            method,
            params,
        };

        let response = self.client.post(endpoint).json(&request).send().await?;
        let response = response.error_for_status()?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        extract_result(body)
    }
}

/// Splits a JSON-RPC response envelope into its result or protocol error.
fn extract_result(mut body: Value) -> Result<Value, RpcError> {
    if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown RPC error")
            .to_string();
        return Err(RpcError::Protocol { code, message });
    }

    match body.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(RpcError::InvalidResponse(
            "response has neither result nor error".into(),
        )),
    }
}

#[async_trait::async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        let params = &params;
        self.retry
            .run(method, move || self.send_once(endpoint, method, params))
            .await
    }
}
