mod aggregator;
pub use aggregator::*;

pub mod gas;
pub mod pricing;
pub mod provider;
