//! Removes source-specific noise from a block before it is fingerprinted.

use std::ops::Deref;

use crate::models::BlockRecord;

/// A block with every transaction's diagnostic log removed.
///
/// Only [`canonicalize`] builds one, so holding a `CanonicalRecord` means
/// the noise has been stripped. It owns its own copy of the block; the
/// record it was derived from is left untouched for the artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord(BlockRecord);

impl CanonicalRecord {
    /// Consumes the wrapper, returning the canonical block.
    pub fn into_inner(self) -> BlockRecord {
        self.0
    }
}

impl Deref for CanonicalRecord {
    type Target = BlockRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Produces the canonical form of `block`.
///
/// Log messages are replayed by each node and differ between two
/// structurally identical blocks, so they are cleared. Nothing else changes.
pub fn canonicalize(block: &BlockRecord) -> CanonicalRecord {
    let mut canonical = block.clone();
    for meta in canonical.transactions.iter_mut().filter_map(|tx| tx.meta.as_mut()) {
        meta.log_messages.clear();
    }
    CanonicalRecord(canonical)
}
