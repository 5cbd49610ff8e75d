//! This module contains the artifact persistence layer.

pub mod error;
pub mod filesystem;
pub use filesystem::FsArtifactStore;
pub mod traits;
