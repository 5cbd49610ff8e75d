//! Builders for creating `BlockRecord` instances for testing.

use crate::models::block::{
    BlockRecord, Message, Reward, Transaction, TransactionMeta, TransactionRecord,
};

/// A builder for creating `BlockRecord` instances for testing.
#[derive(Debug, Clone, Default)]
pub struct BlockRecordBuilder {
    record: BlockRecord,
}

impl BlockRecordBuilder {
    /// Creates a new `BlockRecordBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the slot.
    pub fn sequence(mut self, sequence: u64) -> Self {
        self.record.sequence = sequence;
        self
    }

    /// Sets the parent slot.
    pub fn parent_sequence(mut self, parent_sequence: u64) -> Self {
        self.record.parent_sequence = parent_sequence;
        self
    }

    /// Sets the block hash.
    pub fn content_hash(mut self, hash: &str) -> Self {
        self.record.content_hash = hash.to_string();
        self
    }

    /// Sets the parent block hash.
    pub fn parent_content_hash(mut self, hash: &str) -> Self {
        self.record.parent_content_hash = hash.to_string();
        self
    }

    /// Adds a transaction to the block.
    pub fn transaction(mut self, tx: TransactionRecord) -> Self {
        self.record.transactions.push(tx);
        self
    }

    /// Adds a block reward.
    pub fn reward(mut self, reward: Reward) -> Self {
        self.record.rewards.push(reward);
        self
    }

    /// Builds the `BlockRecord` with the provided values.
    pub fn build(self) -> BlockRecord {
        self.record
    }
}

/// A builder for creating `TransactionRecord` instances for testing.
///
/// Starts with an empty transaction and an empty meta.
#[derive(Debug, Clone)]
pub struct TransactionRecordBuilder {
    signatures: Vec<Vec<u8>>,
    meta: Option<TransactionMeta>,
}

impl Default for TransactionRecordBuilder {
    fn default() -> Self {
        Self { signatures: Vec::new(), meta: Some(TransactionMeta::default()) }
    }
}

impl TransactionRecordBuilder {
    /// Creates a new `TransactionRecordBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw signature.
    pub fn signature(mut self, signature: Vec<u8>) -> Self {
        self.signatures.push(signature);
        self
    }

    /// Sets the fee paid.
    pub fn fee(mut self, fee: u64) -> Self {
        self.meta.get_or_insert_with(TransactionMeta::default).fee = fee;
        self
    }

    /// Appends a diagnostic log line.
    pub fn log(mut self, line: &str) -> Self {
        self.meta.get_or_insert_with(TransactionMeta::default).log_messages.push(line.to_string());
        self
    }

    /// Drops the execution metadata altogether.
    pub fn without_meta(mut self) -> Self {
        self.meta = None;
        self
    }

    /// Builds the `TransactionRecord` with the provided values.
    pub fn build(self) -> TransactionRecord {
        TransactionRecord {
            transaction: Some(Transaction {
                signatures: self.signatures,
                message: Some(Message::default()),
            }),
            meta: self.meta,
        }
    }
}
