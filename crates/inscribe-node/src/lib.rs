//! inscribe-node: Bitcoin Core adapter for the writer and aggregator seams.

pub mod builder;
pub mod poller;
pub mod rpc;
pub mod script;

pub use builder::RpcTransactionBuilder;
pub use poller::BlockPoller;
pub use rpc::{RpcClient, RpcError};
