use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// A SHA-256 digest of a canonical block encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wraps a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering used in logs and alerts.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// The result of comparing both sources for one sequence.
///
/// Lives for a single cycle; only persisted (indirectly, through the
/// divergence artifacts) when the fingerprints differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    /// The sequence both sources were asked for.
    pub sequence: u64,
    /// Fingerprint of the streaming source's canonical record.
    pub fingerprint_a: Fingerprint,
    /// Fingerprint of the point-fetch source's canonical record.
    pub fingerprint_b: Fingerprint,
    /// Whether both fingerprints are equal.
    pub matched: bool,
    /// When the comparison was made.
    pub timestamp: DateTime<Utc>,
}

impl ComparisonOutcome {
    /// Compares two fingerprints computed for `sequence`.
    pub fn new(sequence: u64, fingerprint_a: Fingerprint, fingerprint_b: Fingerprint) -> Self {
        Self {
            sequence,
            fingerprint_a,
            fingerprint_b,
            matched: fingerprint_a == fingerprint_b,
            timestamp: Utc::now(),
        }
    }
}
