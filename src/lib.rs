//! Gas fee estimation across EVM chains.
//!
//! Each configured chain is priced by its fee model (`l1`, `optimism`,
//! `arbitrum`, `linea`) from live JSON-RPC observations. Snapshots are cached
//! with a TTL and the last successful result per chain is kept to answer, marked
//! stale, when the chain's node is unavailable.
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod utils;
