//! Deterministic content digests for canonical records.
//!
//! Records are encoded with prost. The model has no maps and prost writes
//! fields in tag order, so equal records always encode to equal bytes no
//! matter which source they came from.

use prost::Message;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::canonicalizer::CanonicalRecord;
use crate::models::Fingerprint;

/// Errors raised while fingerprinting a record.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The record could not be encoded.
    #[error("Failed to encode canonical record: {0}")]
    Encode(#[from] prost::EncodeError),
}

/// Encodes `record` and returns the SHA-256 digest of the bytes.
pub fn fingerprint(record: &CanonicalRecord) -> Result<Fingerprint, FingerprintError> {
    let mut buf = Vec::with_capacity(record.encoded_len());
    record.encode(&mut buf)?;
    Ok(Fingerprint::from_bytes(Sha256::digest(&buf).into()))
}
