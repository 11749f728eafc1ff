//! Constants shared across the fee engine.
mod gas;
mod rpc;

pub use gas::*;
pub use rpc::*;
