//! This module contains the data models shared by the sources, the
//! comparison engine and the reporters.

pub mod block;
mod comparison;
mod divergence;

pub use block::BlockRecord;
pub use comparison::{ComparisonOutcome, Fingerprint};
pub use divergence::{DivergenceAlert, DivergenceArtifact};
