//! Data sources the comparator reads from.

pub mod firehose;
pub mod rpc;
mod rpc_types;
pub mod traits;
mod tx_error;

pub use firehose::FirehoseSource;
pub use rpc::RpcFetcherSource;
pub use traits::{DataSourceError, Fetched, PointSource, StreamingSource};
