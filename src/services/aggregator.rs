//! Fans out one fee lookup per configured chain and gathers the results.
use crate::{
    config::ChainProfile,
    models::ChainFeePayload,
    services::{
        gas::FeeService,
        pricing::{PriceQuoteProvider, PricingError},
        provider::RpcTransport,
    },
    utils::sanitize_urls,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use futures::future::join_all;
use log::{info, warn};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    pub precise_requested: bool,
    pub precise_enabled: bool,
    pub cache_ttl_seconds: u64,
    /// RFC 3339 timestamp of report assembly.
    pub generated_at: String,
}

/// Fiat quotes attached next to the fee rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceOverlay {
    pub currency: String,
    pub quotes: HashMap<String, BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeReport {
    pub meta: ReportMeta,
    /// One row per configured chain, in configuration order.
    pub data: Vec<ChainFeePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceOverlay>,
}

pub struct FeeAggregator<T: ?Sized> {
    service: Arc<FeeService<T>>,
    chains: Vec<Arc<ChainProfile>>,
}

impl<T: RpcTransport + ?Sized> FeeAggregator<T> {
    pub fn new(service: Arc<FeeService<T>>, chains: Vec<ChainProfile>) -> Self {
        Self {
            service,
            chains: chains.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn chains(&self) -> &[Arc<ChainProfile>] {
        &self.chains
    }

    /// Looks up every chain concurrently. One chain's failure only affects
    /// its own row.
    pub async fn collect(&self, precise: bool, force_refresh: bool) -> FeeReport {
        let lookups = self
            .chains
            .iter()
            .map(|chain| self.service.get_chain_fee(chain, precise, force_refresh));
        let data = join_all(lookups).await;

        let failed = data.iter().filter(|row| row.error().is_some()).count();
        let stale = data.iter().filter(|row| row.is_stale()).count();
        info!(
            "collected fees for {} chains ({} stale, {} failed)",
            data.len(),
            stale,
            failed
        );

        FeeReport {
            meta: ReportMeta {
                precise_requested: precise,
                precise_enabled: self.service.precise_mode_enabled(),
                cache_ttl_seconds: self.service.cache().ttl().as_secs(),
                generated_at: Utc::now().to_rfc3339(),
            },
            data,
            prices: None,
        }
    }

    /// Fetches fiat quotes for the configured chains' price symbols.
    ///
    /// Pricing failures are recorded in the overlay and never touch fee rows.
    pub async fn attach_prices(
        &self,
        report: &mut FeeReport,
        provider: &dyn PriceQuoteProvider,
        currency: &str,
        force_refresh: bool,
    ) {
        let symbols: Vec<String> = self
            .chains
            .iter()
            .map(|chain| chain.price_symbol())
            .collect();

        let currency = currency.to_uppercase();
        let overlay = match provider
            .price_quotes(&symbols, &currency, force_refresh)
            .await
        {
            Ok(quotes) => PriceOverlay {
                currency,
                quotes,
                error: None,
            },
            Err(err) => {
                warn!("fiat quotes unavailable: {}", err);
                PriceOverlay {
                    currency,
                    quotes: HashMap::new(),
                    error: Some(pricing_error_message(&err)),
                }
            }
        };
        report.prices = Some(overlay);
    }
}

fn pricing_error_message(err: &PricingError) -> String {
    sanitize_urls(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{config_file::test_utils::create_chain_profile, EstimateSettings, FeeModel},
        models::RpcError,
        services::{
            gas::FeeCache,
            pricing::MockPriceQuoteProvider,
            provider::{MockEndpointResolver, MockRpcTransport},
        },
    };
    use serde_json::json;
    use std::{str::FromStr, time::Duration};

    /// `polygon` has no endpoint, `slow` answers only `eth_gasPrice`.
    fn aggregator() -> FeeAggregator<MockRpcTransport> {
        let mut resolver = MockEndpointResolver::new();
        resolver.expect_resolve().returning(|chain| match chain.key.as_str() {
            "polygon" => Err(RpcError::Configuration("RPC_POLYGON_URL or INFURA_PROJECT_ID.".into())),
            key => Ok(format!("https://rpc.test/{key}")),
        });

        let mut transport = MockRpcTransport::new();
        transport
            .expect_call()
            .returning(|endpoint, method, _| match (endpoint, method) {
                (_, "eth_estimateGas") => Ok(json!("0x5208")),
                ("https://rpc.test/slow", "eth_feeHistory") => Err(RpcError::Protocol {
                    code: -32601,
                    message: "method not found".into(),
                }),
                (_, "eth_feeHistory") => Ok(json!({
                    "oldestBlock": "0x1",
                    "gasUsedRatio": [0.5],
                    "baseFeePerGas": ["0x3b9aca00"],
                    "reward": [["0x77359400"]]
                })),
                (_, "eth_gasPrice") => Ok(json!("0x3b9aca00")),
                (_, other) => Err(RpcError::Protocol {
                    code: -32601,
                    message: format!("{other} not found"),
                }),
            });

        let service = FeeService::new(
            Arc::new(transport),
            Arc::new(resolver),
            Arc::new(FeeCache::new(Duration::from_secs(30), 16)),
            EstimateSettings::default(),
            false,
        );

        FeeAggregator::new(
            Arc::new(service),
            vec![
                create_chain_profile("ethereum", FeeModel::L1),
                create_chain_profile("polygon", FeeModel::L1),
                create_chain_profile("slow", FeeModel::Linea),
            ],
        )
    }

    #[tokio::test]
    async fn test_collect_keeps_configuration_order_and_isolates_failures() {
        let report = aggregator().collect(true, false).await;

        let keys: Vec<&str> = report.data.iter().map(|row| row.chain().key.as_str()).collect();
        assert_eq!(keys, ["ethereum", "polygon", "slow"]);

        assert_eq!(report.data[0].fee().unwrap().mode, "l1:eip1559");
        assert!(report.data[1]
            .error()
            .unwrap()
            .contains("RPC_POLYGON_URL"));
        assert_eq!(report.data[2].fee().unwrap().mode, "linea:legacy");
        assert_eq!(report.data[2].fee().unwrap().gas_price.wei, 1_000_000_000);

        assert!(report.meta.precise_requested);
        assert!(!report.meta.precise_enabled);
        assert_eq!(report.meta.cache_ttl_seconds, 30);
        assert!(report.prices.is_none());
    }

    #[tokio::test]
    async fn test_attach_prices_uses_price_symbols() {
        let aggregator = aggregator();
        let mut report = aggregator.collect(false, false).await;

        let mut provider = MockPriceQuoteProvider::new();
        provider
            .expect_price_quotes()
            .withf(|symbols, currency, force| {
                symbols.iter().all(|s| s == "ETH") && currency == "USD" && !force
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(HashMap::from([(
                    "ETH".to_string(),
                    BigDecimal::from_str("2000.25").unwrap(),
                )]))
            });

        aggregator
            .attach_prices(&mut report, &provider, "usd", false)
            .await;

        let prices = report.prices.unwrap();
        assert_eq!(prices.currency, "USD");
        assert_eq!(prices.quotes["ETH"], BigDecimal::from_str("2000.25").unwrap());
        assert_eq!(prices.error, None);
    }

    #[tokio::test]
    async fn test_pricing_failure_leaves_fees_intact() {
        let aggregator = aggregator();
        let mut report = aggregator.collect(false, false).await;
        let rows_before = report.data.clone();

        let mut provider = MockPriceQuoteProvider::new();
        provider
            .expect_price_quotes()
            .returning(|_, _, _| Err(PricingError::MissingApiKey));

        aggregator
            .attach_prices(&mut report, &provider, "EUR", false)
            .await;

        assert_eq!(report.data, rows_before);
        let prices = report.prices.unwrap();
        assert!(prices.quotes.is_empty());
        assert_eq!(
            prices.error.as_deref(),
            Some("CoinMarketCap API key is not configured")
        );
    }
}
