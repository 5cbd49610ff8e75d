//! The comparison engine: canonical form, fingerprints and the cycle that
//! ties them to the data sources.

pub mod canonicalizer;
pub mod comparator;
pub mod fingerprint;

pub use canonicalizer::{CanonicalRecord, canonicalize};
pub use comparator::{Comparator, CycleError, CycleReport};
pub use fingerprint::{FingerprintError, fingerprint};
