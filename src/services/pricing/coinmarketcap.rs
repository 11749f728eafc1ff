//! CoinMarketCap `quotes/latest` client with a TTL cache.
use crate::{
    services::pricing::{PriceQuoteProvider, PricingError},
    utils::sanitize_urls,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use dashmap::DashMap;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::{BTreeSet, HashMap},
    str::FromStr,
    time::{Duration, Instant},
};

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Cache key: upper-cased currency plus sorted, de-duplicated symbols.
type QuoteKey = (String, Vec<String>);

#[derive(Debug, Clone)]
struct CachedQuotes {
    quotes: HashMap<String, BigDecimal>,
    fetched_at: Instant,
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, Value>,
}

#[derive(Debug)]
pub struct CoinMarketCapClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    ttl: Duration,
    cache: DashMap<QuoteKey, CachedQuotes>,
}

impl CoinMarketCapClient {
    pub fn new(client: Client, api_url: String, api_key: Option<String>, ttl: Duration) -> Self {
        Self {
            client,
            api_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            ttl,
            cache: DashMap::new(),
        }
    }

    fn cached(&self, key: &QuoteKey) -> Option<HashMap<String, BigDecimal>> {
        let entry = self.cache.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.quotes.clone())
        } else {
            None
        }
    }

    async fn fetch(
        &self,
        symbols: &[String],
        currency: &str,
    ) -> Result<HashMap<String, BigDecimal>, PricingError> {
        let api_key = self.api_key.as_deref().ok_or(PricingError::MissingApiKey)?;

        debug!("fetching {} quotes for {}", currency, symbols.join(","));
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("symbol", symbols.join(",")), ("convert", currency.to_string())])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| PricingError::Http(sanitize_urls(&e.to_string())))?;

        let body: QuotesResponse = response.json().await?;

        let mut quotes = HashMap::new();
        for symbol in symbols {
            let price = body
                .data
                .get(symbol)
                .and_then(|entry| entry.pointer(&format!("/quote/{currency}/price")))
                .and_then(|price| match price {
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                });
            match price {
                Some(price) => {
                    let price = BigDecimal::from_str(&price)
                        .map_err(|e| PricingError::InvalidResponse(e.to_string()))?;
                    quotes.insert(symbol.clone(), price);
                }
                None => warn!("no {} quote for {}", currency, symbol),
            }
        }
        Ok(quotes)
    }
}

#[async_trait]
impl PriceQuoteProvider for CoinMarketCapClient {
    async fn price_quotes(
        &self,
        symbols: &[String],
        currency: &str,
        force_refresh: bool,
    ) -> Result<HashMap<String, BigDecimal>, PricingError> {
        let currency = currency.to_uppercase();
        let symbols: Vec<String> = symbols
            .iter()
            .map(|symbol| symbol.trim().to_uppercase())
            .filter(|symbol| !symbol.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let key = (currency.clone(), symbols.clone());
        if force_refresh {
            self.cache.remove(&key);
        } else if let Some(quotes) = self.cached(&key) {
            return Ok(quotes);
        }

        let quotes = self.fetch(&symbols, &currency).await?;
        if !quotes.is_empty() {
            self.cache.insert(
                key,
                CachedQuotes {
                    quotes: quotes.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(quotes)
    }
}
