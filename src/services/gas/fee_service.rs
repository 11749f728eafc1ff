//! Cached per-chain fee lookup with stale-on-failure fallback.
//!
//! Resolution order for a key: fresh primary cache entry, live computation,
//! last known good snapshot (marked stale), structured error payload. Failures
//! never escape [`FeeService::get_chain_fee`].
use crate::{
    config::{ChainProfile, EstimateSettings},
    models::{ChainErrorPayload, ChainFeePayload, ChainIdentity, FeeComputation, FeeSnapshot, RpcError},
    services::{
        gas::{compute_fee, FeeCache, FeeCacheKey, FeeContext},
        provider::{EndpointResolver, EvmRpcProvider, RpcTransport},
    },
    utils::sanitize_urls,
};
use log::{debug, warn};
use std::sync::Arc;

const PRECISE_MODE_SUFFIX: &str = ":precise";

pub struct FeeService<T: ?Sized> {
    transport: Arc<T>,
    resolver: Arc<dyn EndpointResolver>,
    cache: Arc<FeeCache>,
    estimate: EstimateSettings,
    enable_precise_mode: bool,
}

impl<T: RpcTransport + ?Sized> FeeService<T> {
    pub fn new(
        transport: Arc<T>,
        resolver: Arc<dyn EndpointResolver>,
        cache: Arc<FeeCache>,
        estimate: EstimateSettings,
        enable_precise_mode: bool,
    ) -> Self {
        Self {
            transport,
            resolver,
            cache,
            estimate,
            enable_precise_mode,
        }
    }

    pub fn cache(&self) -> &Arc<FeeCache> {
        &self.cache
    }

    pub fn precise_mode_enabled(&self) -> bool {
        self.enable_precise_mode
    }

    /// Precise requests only count when the process allows them.
    pub fn effective_precise(&self, requested: bool) -> bool {
        requested && self.enable_precise_mode
    }

    /// Returns the chain's fee payload, computing and caching it when needed.
    pub async fn get_chain_fee(
        &self,
        chain: &Arc<ChainProfile>,
        precise: bool,
        force_refresh: bool,
    ) -> ChainFeePayload {
        let precise = self.effective_precise(precise);
        let key = FeeCacheKey::new(chain, precise);

        if force_refresh && self.cache.remove(&key).is_some() {
            debug!("forced refresh evicted fee entry for {}", chain.key);
        }

        if let Some(snapshot) = self.cache.get(&key) {
            debug!("fee cache hit for {}", chain.key);
            return ChainFeePayload::Fee(snapshot.as_payload());
        }

        match self.compute(chain, precise).await {
            Ok(computation) => {
                let snapshot = self
                    .cache
                    .insert(key, FeeSnapshot::new(chain.clone(), computation));
                ChainFeePayload::Fee(snapshot.as_payload())
            }
            Err(err) => self.degraded_payload(chain, &key, &err),
        }
    }

    async fn compute(
        &self,
        chain: &ChainProfile,
        precise: bool,
    ) -> Result<FeeComputation, RpcError> {
        let url = self.resolver.resolve(chain)?;
        let provider = EvmRpcProvider::new(self.transport.as_ref(), &url);
        let ctx = FeeContext::new(chain, provider, &self.estimate);

        let mut computation = compute_fee(&ctx).await?;
        if precise {
            computation.mode.push_str(PRECISE_MODE_SUFFIX);
        }
        Ok(computation)
    }

    /// Serves the last known good snapshot marked stale, or an error payload.
    fn degraded_payload(
        &self,
        chain: &ChainProfile,
        key: &FeeCacheKey,
        err: &RpcError,
    ) -> ChainFeePayload {
        let message = sanitize_urls(&err.to_string());

        match self.cache.last_known_good(key) {
            Some(snapshot) => {
                warn!(
                    "serving stale fee for {} after {}: {}",
                    chain.key,
                    err.class(),
                    message
                );
                let mut payload = snapshot.as_payload();
                let stale_note = format!("stale cache ({})", err.class());
                payload.notes = if payload.notes.is_empty() {
                    stale_note
                } else {
                    format!("{}; {}", payload.notes, stale_note)
                };
                payload.stale = Some(true);
                payload.debug = Some(message);
                ChainFeePayload::Fee(payload)
            }
            None => {
                warn!("no fee available for {}: {}", chain.key, message);
                ChainFeePayload::Error(ChainErrorPayload {
                    chain: ChainIdentity::from(chain),
                    error: message,
                })
            }
        }
    }
}
