//! Fiat price quotes for native tokens.
//!
//! The fee engine never depends on prices; they are an overlay applied to
//! native fee amounts by consumers of the fee report.
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use thiserror::Error;

mod coinmarketcap;
pub use coinmarketcap::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("CoinMarketCap API key is not configured")]
    MissingApiKey,
    #[error("price request failed: {0}")]
    Http(String),
    #[error("invalid price response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PricingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PricingError::InvalidResponse(err.to_string())
        } else {
            PricingError::Http(err.to_string())
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceQuoteProvider: Send + Sync {
    /// Price of one unit of each symbol in `currency`, keyed by upper-cased
    /// symbol. Symbols without a quote are absent from the result.
    async fn price_quotes(
        &self,
        symbols: &[String],
        currency: &str,
        force_refresh: bool,
    ) -> Result<HashMap<String, BigDecimal>, PricingError>;
}
