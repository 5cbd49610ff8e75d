//! This module defines the narrow capabilities the comparator needs from
//! each data source.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::BlockRecord;

/// Custom error type for data source operations.
#[derive(Error, Debug)]
pub enum DataSourceError {
    /// Error when establishing or configuring the connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The remote call failed at the transport level.
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The remote service answered with an error.
    #[error("Remote error {code}: {message}")]
    Remote {
        /// Error code reported by the service.
        code: i64,
        /// Error message reported by the service.
        message: String,
    },

    /// The stream ended or yielded a response without a block.
    #[error("Received empty block")]
    EmptyPayload,

    /// The payload could not be decoded into a block record.
    #[error("Failed to decode block: {0}")]
    Decode(String),
}

/// The outcome of a point fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// The record stored at the requested sequence.
    Block(BlockRecord),
    /// The sequence is a valid position with no record.
    Skipped,
}

/// A continuous feed that can produce its most recent block on demand.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StreamingSource: Send + Sync {
    /// Short label used in logs and artifact file names.
    fn label(&self) -> &'static str;

    /// Fetches the most recent block available on the feed.
    ///
    /// The returned record's `sequence` decides which position the rest of
    /// the cycle compares.
    async fn fetch_latest(&self) -> Result<BlockRecord, DataSourceError>;
}

/// A request/response service that returns the block at a given position.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PointSource: Send + Sync {
    /// Short label used in logs and artifact file names.
    fn label(&self) -> &'static str;

    /// Fetches the block stored at `sequence`.
    async fn fetch_by_sequence(&self, sequence: u64) -> Result<Fetched, DataSourceError>;
}
