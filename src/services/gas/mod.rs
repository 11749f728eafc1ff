//! This module contains services related to gas price resolution, fee model
//! strategies and fee snapshot caching.
pub mod cache;
pub mod evm_gas_price;
pub mod fee_model;
pub mod fee_service;
pub mod gas_estimate;
pub mod l2_fee;
pub mod optimism_extra_fee;

pub use cache::*;
pub use evm_gas_price::*;
pub use fee_model::*;
pub use fee_service::*;
pub use gas_estimate::*;
