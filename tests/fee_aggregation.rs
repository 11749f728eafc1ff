use gas_fee_engine::{
    config::{parse_chains, ChainProfile, EstimateSettings},
    models::RpcError,
    services::{
        gas::{FeeCache, FeeService},
        provider::{resolve_rpc_url, EndpointResolver, HttpRpcTransport, RetryPolicy},
        FeeAggregator,
    },
};
use mockito::{Matcher, Mock, Server};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc, time::Duration};

const CHAINS: &str = r#"[
    {"key": "ethereum", "display_name": "Ethereum", "symbol": "ETH", "chain_id": 1,
     "fee_model": "l1", "rpc_env": "RPC_ETHEREUM_URL"},
    {"key": "optimism", "display_name": "OP Mainnet", "symbol": "ETH", "chain_id": 10,
     "fee_model": "optimism", "erc20_gas_limit": 65000, "rpc_env": "RPC_OPTIMISM_URL"},
    {"key": "avalanche", "display_name": "Avalanche", "symbol": "AVAX", "chain_id": 43114,
     "rpc_env": "RPC_AVALANCHE_URL"}
]"#;

/// Resolves endpoints from a fixed variable map instead of the process env.
struct MapResolver(HashMap<String, String>);

impl EndpointResolver for MapResolver {
    fn resolve(&self, chain: &ChainProfile) -> Result<String, RpcError> {
        resolve_rpc_url(chain, |name| self.0.get(name).cloned())
    }
}

fn rpc_body(result: Value) -> String {
    json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string()
}

async fn mock_method(server: &mut Server, path: &str, method: &str, result: Value) -> Mock {
    server
        .mock("POST", path)
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_body(result))
        .create_async()
        .await
}

fn aggregator(server: &Server) -> FeeAggregator<HttpRpcTransport> {
    let vars = HashMap::from([
        ("RPC_ETHEREUM_URL".to_string(), format!("{}/eth", server.url())),
        ("RPC_OPTIMISM_URL".to_string(), format!("{}/op", server.url())),
    ]);
    let transport =
        HttpRpcTransport::new(Duration::from_secs(5), 4, RetryPolicy::new(2, Duration::ZERO))
            .unwrap();
    let service = FeeService::new(
        Arc::new(transport),
        Arc::new(MapResolver(vars)),
        Arc::new(FeeCache::new(Duration::from_secs(60), 16)),
        EstimateSettings::default(),
        false,
    );
    FeeAggregator::new(Arc::new(service), parse_chains(CHAINS).unwrap())
}

#[tokio::test]
async fn test_report_covers_every_fee_model_row() {
    let mut server = Server::new_async().await;
    let _eth_estimate = mock_method(&mut server, "/eth", "eth_estimateGas", json!("0x5208")).await;
    let eth_history = server
        .mock("POST", "/eth")
        .match_body(Matcher::PartialJson(
            json!({"method": "eth_feeHistory", "params": ["0x5", "latest", [50]]}),
        ))
        .with_status(200)
        .with_body(rpc_body(json!({
            "oldestBlock": "0x100",
            "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
            "gasUsedRatio": [0.4],
            "reward": [["0x77359400"]]
        })))
        .expect(1)
        .create_async()
        .await;
    let _op_estimate = mock_method(&mut server, "/op", "eth_estimateGas", json!("0x5208")).await;
    let _op_price = mock_method(&mut server, "/op", "eth_gasPrice", json!("0xf4240")).await;
    let _op_oracle = mock_method(
        &mut server,
        "/op",
        "eth_call",
        json!("0x000000000000000000000000000000000000000000000000000000e8d4a51000"),
    )
    .await;

    let aggregator = aggregator(&server);
    let report = aggregator.collect(false, false).await;
    let rendered = serde_json::to_value(&report).unwrap();

    let eth = &rendered["data"][0];
    assert_eq!(eth["chain"]["key"], "ethereum");
    assert_eq!(eth["gas_price"], json!({"wei": 3_000_000_000u64, "gwei": "3.0000"}));
    assert_eq!(eth["gas_limit"], 21_000);
    assert_eq!(
        eth["native_fee"],
        json!({"wei": 63_000_000_000_000u64, "formatted": "0.00006300"})
    );
    assert_eq!(eth["erc20"]["fee"]["wei"], 195_000_000_000_000u64);
    assert_eq!(eth["mode"], "l1:eip1559");
    assert!(eth.get("stale").is_none());
    assert!(eth.get("l1_fee").is_none());

    let op = &rendered["data"][1];
    assert_eq!(op["mode"], "optimism:l2+l1");
    assert_eq!(op["l1_fee"]["wei"], 1_000_000_000_000u64);
    assert_eq!(op["native_fee"]["wei"], 1_021_000_000_000u64);
    // 1e6 * 65000 + round_half_up(1e12 * 65000 / 21000)
    //   = 65_000_000_000 + 3_095_238_095_238
    assert_eq!(op["erc20"]["fee"]["wei"], 3_160_238_095_238u64);

    let avax = &rendered["data"][2];
    assert!(avax["error"]
        .as_str()
        .unwrap()
        .contains("RPC_AVALANCHE_URL"));
    assert!(avax.get("gas_price").is_none());

    assert_eq!(rendered["meta"]["precise_enabled"], false);
    assert_eq!(rendered["meta"]["cache_ttl_seconds"], 60);

    // second pass is answered from cache
    let again = aggregator.collect(false, false).await;
    assert_eq!(again.data, report.data);
    eth_history.assert_async().await;
}

#[tokio::test]
async fn test_upstream_outage_serves_stale_row() {
    let mut server = Server::new_async().await;
    let estimate = mock_method(&mut server, "/eth", "eth_estimateGas", json!("0x5208")).await;
    let history = mock_method(
        &mut server,
        "/eth",
        "eth_feeHistory",
        json!({
            "oldestBlock": "0x1",
            "gasUsedRatio": [0.5],
            "baseFeePerGas": ["0x3b9aca00"],
            "reward": [["0x77359400"]]
        }),
    )
    .await;

    let aggregator = aggregator(&server);
    let fresh = aggregator.collect(false, false).await;

    estimate.remove_async().await;
    history.remove_async().await;
    let _outage = server
        .mock("POST", "/eth")
        .with_status(503)
        .create_async()
        .await;

    let degraded = aggregator.collect(false, true).await;
    let fresh_eth = fresh.data[0].fee().unwrap();
    let stale_eth = degraded.data[0].fee().unwrap();

    assert_eq!(stale_eth.stale, Some(true));
    assert_eq!(stale_eth.native_fee, fresh_eth.native_fee);
    assert!(stale_eth.notes.ends_with("stale cache (TransportError)"));
    assert!(degraded.data[0].error().is_none());

    let debug = stale_eth.debug.as_deref().unwrap();
    assert!(debug.contains("http://127.0.0.1/***"), "{debug}");
    assert!(!debug.contains("/eth"));
}

#[tokio::test]
async fn test_transient_unavailable_is_absorbed_by_retry() {
    let mut server = Server::new_async().await;
    let _flaky = server
        .mock("POST", "/eth")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let _estimate = mock_method(&mut server, "/eth", "eth_estimateGas", json!("0x5208")).await;
    let _history = mock_method(
        &mut server,
        "/eth",
        "eth_feeHistory",
        json!({
            "oldestBlock": "0x1",
            "gasUsedRatio": [0.5],
            "baseFeePerGas": ["0x3b9aca00"],
            "reward": [["0x77359400"]]
        }),
    )
    .await;

    let report = aggregator(&server).collect(false, false).await;
    let eth = report.data[0].fee().unwrap();

    assert_eq!(eth.gas_price.wei, 3_000_000_000);
    assert_eq!(eth.gas_limit, 21_000);
    assert_eq!(eth.notes, "eth_estimateGas; feeHistory baseFee+p50 reward");
    assert_eq!(eth.stale, None);
}
