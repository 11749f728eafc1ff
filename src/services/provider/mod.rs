//! Chain node access: JSON-RPC transport, retry policy, endpoint resolution
//! and typed EVM calls.
mod endpoint;
pub use endpoint::*;

mod evm;
pub use evm::*;

mod retry;
pub use retry::*;

mod rpc;
pub use rpc::*;
