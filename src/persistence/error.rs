//! This module contains the error types for the persistence layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting divergence artifacts.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The artifact could not be written to disk.
    #[error("Failed to write artifact {}: {source}", path.display())]
    Io {
        /// The file or directory that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An error occurred during serialization.
    #[error("Failed to serialize artifact: {0}")]
    SerializationError(#[from] serde_json::Error),
}
