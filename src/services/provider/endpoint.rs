//! RPC endpoint resolution.
//!
//! A chain's URL comes from the environment variable named by its profile. When
//! that is unset, chains that carry a shared-provider network name fall back to
//! the shared provider URL built from the project credential.
use crate::{
    config::ChainProfile,
    constants::{SHARED_PROVIDER_CREDENTIAL_ENV, SHARED_PROVIDER_URL_TEMPLATE},
    models::RpcError,
};

#[cfg_attr(test, mockall::automock)]
pub trait EndpointResolver: Send + Sync {
    /// Resolves the chain's RPC URL; failures are configuration errors.
    fn resolve(&self, chain: &ChainProfile) -> Result<String, RpcError>;
}

/// Resolves endpoints from the process environment at call time.
#[derive(Debug, Clone, Default)]
pub struct EnvEndpointResolver;

impl EndpointResolver for EnvEndpointResolver {
    fn resolve(&self, chain: &ChainProfile) -> Result<String, RpcError> {
        resolve_rpc_url(chain, |name| std::env::var(name).ok())
    }
}

/// Resolves `chain`'s RPC URL through `lookup`.
pub fn resolve_rpc_url<F>(chain: &ChainProfile, lookup: F) -> Result<String, RpcError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(url) = get(&chain.rpc_env) {
        return Ok(url);
    }

    if let (Some(network), Some(project_id)) = (
        chain.infura_network.as_deref(),
        get(SHARED_PROVIDER_CREDENTIAL_ENV),
    ) {
        return Ok(SHARED_PROVIDER_URL_TEMPLATE
            .replace("{network}", network)
            .replace("{project_id}", &project_id));
    }

    Err(RpcError::Configuration(format!(
        "{} or {}.",
        chain.rpc_env, SHARED_PROVIDER_CREDENTIAL_ENV
    )))
}
