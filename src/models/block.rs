//! The source-agnostic block record shared by both data sources.
//!
//! The messages mirror `sf.solana.type.v1` field for field (same tags and
//! wire types), so a Firehose payload decodes straight into [`BlockRecord`]
//! and the RPC fetcher only has to convert JSON into the same shape. Field
//! names on the Rust side follow the comparison vocabulary (`sequence`,
//! `content_hash`); the serde names follow the protobuf JSON names so the
//! divergence artifacts read like any other Solana block dump.

use serde::{Serialize, Serializer};

/// One ledger block as returned by either source.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    /// Hash of the preceding block.
    #[prost(string, tag = "1")]
    #[serde(rename = "previousBlockhash")]
    pub parent_content_hash: String,
    /// Hash identifying this block's payload, as supplied by the source.
    #[prost(string, tag = "2")]
    #[serde(rename = "blockhash")]
    pub content_hash: String,
    /// Position of the preceding block.
    #[prost(uint64, tag = "3")]
    #[serde(rename = "parentSlot")]
    pub parent_sequence: u64,
    /// Transactions in block order.
    #[prost(message, repeated, tag = "4")]
    pub transactions: Vec<TransactionRecord>,
    /// Block-level rewards.
    #[prost(message, repeated, tag = "5")]
    pub rewards: Vec<Reward>,
    /// Estimated production time.
    #[prost(message, optional, tag = "6")]
    pub block_time: Option<UnixTimestamp>,
    /// Height of the block, when the source knows it.
    #[prost(message, optional, tag = "7")]
    pub block_height: Option<BlockHeight>,
    /// Position of this block in the ledger.
    #[prost(uint64, tag = "20")]
    #[serde(rename = "slot")]
    pub sequence: u64,
}

/// A transaction together with its execution metadata.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// The transaction as signed.
    #[prost(message, optional, tag = "1")]
    pub transaction: Option<Transaction>,
    /// Execution metadata, absent for unprocessed transactions.
    #[prost(message, optional, tag = "2")]
    pub meta: Option<TransactionMeta>,
}

/// A signed transaction.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Signatures, fee payer first.
    #[prost(bytes = "vec", repeated, tag = "1")]
    #[serde(serialize_with = "base58::serialize_all")]
    pub signatures: Vec<Vec<u8>>,
    /// The signed message.
    #[prost(message, optional, tag = "2")]
    pub message: Option<Message>,
}

/// The signed part of a transaction.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Account counts needed to interpret `account_keys`.
    #[prost(message, optional, tag = "1")]
    pub header: Option<MessageHeader>,
    /// Static account keys.
    #[prost(bytes = "vec", repeated, tag = "2")]
    #[serde(serialize_with = "base58::serialize_all")]
    pub account_keys: Vec<Vec<u8>>,
    /// Blockhash the transaction was built against.
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "base58::serialize")]
    pub recent_blockhash: Vec<u8>,
    /// Top-level instructions.
    #[prost(message, repeated, tag = "4")]
    pub instructions: Vec<CompiledInstruction>,
    /// Whether this is a v0 message.
    #[prost(bool, tag = "5")]
    pub versioned: bool,
    /// Lookup tables referenced by a v0 message.
    #[prost(message, repeated, tag = "6")]
    pub address_table_lookups: Vec<MessageAddressTableLookup>,
}

/// Signature and read-only account counts of a message.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    /// Number of signatures the message requires.
    #[prost(uint32, tag = "1")]
    pub num_required_signatures: u32,
    /// Signed accounts that are read-only.
    #[prost(uint32, tag = "2")]
    pub num_readonly_signed_accounts: u32,
    /// Unsigned accounts that are read-only.
    #[prost(uint32, tag = "3")]
    pub num_readonly_unsigned_accounts: u32,
}

/// Accounts loaded from an address lookup table.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAddressTableLookup {
    /// Address of the lookup table.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "base58::serialize")]
    pub account_key: Vec<u8>,
    /// Table indexes loaded as writable.
    #[prost(bytes = "vec", tag = "2")]
    pub writable_indexes: Vec<u8>,
    /// Table indexes loaded as read-only.
    #[prost(bytes = "vec", tag = "3")]
    pub readonly_indexes: Vec<u8>,
}

/// A top-level instruction referencing accounts by index.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    /// Index of the program in the account keys.
    #[prost(uint32, tag = "1")]
    pub program_id_index: u32,
    /// Indexes of the accounts passed to the program.
    #[prost(bytes = "vec", tag = "2")]
    pub accounts: Vec<u8>,
    /// Program input.
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "base58::serialize")]
    pub data: Vec<u8>,
}

/// Execution results of a transaction.
///
/// `log_messages` is the diagnostic log. It depends on the node that
/// replayed the transaction and is removed before fingerprinting.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    /// Set when the transaction failed.
    #[prost(message, optional, tag = "1")]
    pub err: Option<TransactionError>,
    /// Fee charged, in lamports.
    #[prost(uint64, tag = "2")]
    pub fee: u64,
    /// Account balances before execution.
    #[prost(uint64, repeated, tag = "3")]
    pub pre_balances: Vec<u64>,
    /// Account balances after execution.
    #[prost(uint64, repeated, tag = "4")]
    pub post_balances: Vec<u64>,
    /// Cross-program invocations, grouped by top-level instruction.
    #[prost(message, repeated, tag = "5")]
    pub inner_instructions: Vec<InnerInstructions>,
    /// Program logs.
    #[prost(string, repeated, tag = "6")]
    pub log_messages: Vec<String>,
    /// Token balances before execution.
    #[prost(message, repeated, tag = "7")]
    pub pre_token_balances: Vec<TokenBalance>,
    /// Token balances after execution.
    #[prost(message, repeated, tag = "8")]
    pub post_token_balances: Vec<TokenBalance>,
    /// Rewards paid by this transaction.
    #[prost(message, repeated, tag = "9")]
    pub rewards: Vec<Reward>,
    /// Set when the node did not record inner instructions.
    #[prost(bool, tag = "10")]
    pub inner_instructions_none: bool,
    /// Set when the node did not record logs.
    #[prost(bool, tag = "11")]
    pub log_messages_none: bool,
    /// Writable accounts loaded from lookup tables.
    #[prost(bytes = "vec", repeated, tag = "12")]
    #[serde(serialize_with = "base58::serialize_all")]
    pub loaded_writable_addresses: Vec<Vec<u8>>,
    /// Read-only accounts loaded from lookup tables.
    #[prost(bytes = "vec", repeated, tag = "13")]
    #[serde(serialize_with = "base58::serialize_all")]
    pub loaded_readonly_addresses: Vec<Vec<u8>>,
    /// Data returned by the transaction, if any.
    #[prost(message, optional, tag = "14")]
    pub return_data: Option<ReturnData>,
    /// Set when the node did not record return data.
    #[prost(bool, tag = "15")]
    pub return_data_none: bool,
    /// Compute units spent executing the transaction.
    #[prost(uint64, optional, tag = "16")]
    pub compute_units_consumed: Option<u64>,
}

/// A transaction failure, as the node encodes it.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct TransactionError {
    /// Bincode-encoded `TransactionError`.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "base58::serialize")]
    pub err: Vec<u8>,
}

/// Instructions invoked by one top-level instruction.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstructions {
    /// Index of the top-level instruction.
    #[prost(uint32, tag = "1")]
    pub index: u32,
    /// Invocations in execution order.
    #[prost(message, repeated, tag = "2")]
    pub instructions: Vec<InnerInstruction>,
}

/// A cross-program invocation.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstruction {
    /// Index of the invoked program in the account keys.
    #[prost(uint32, tag = "1")]
    pub program_id_index: u32,
    /// Indexes of the accounts passed to the program.
    #[prost(bytes = "vec", tag = "2")]
    pub accounts: Vec<u8>,
    /// Program input.
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "base58::serialize")]
    pub data: Vec<u8>,
    /// Invocation depth, starting at 1.
    #[prost(uint32, optional, tag = "4")]
    pub stack_height: Option<u32>,
}

/// SPL token balance of one account.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Index of the token account in the account keys.
    #[prost(uint32, tag = "1")]
    pub account_index: u32,
    /// Mint address.
    #[prost(string, tag = "2")]
    pub mint: String,
    /// Balance.
    #[prost(message, optional, tag = "3")]
    pub ui_token_amount: Option<UiTokenAmount>,
    /// Owner of the token account.
    #[prost(string, tag = "4")]
    pub owner: String,
    /// Token program owning the account.
    #[prost(string, tag = "5")]
    pub program_id: String,
}

/// A token amount in raw and display form.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    /// Amount scaled by `decimals`.
    #[prost(double, tag = "1")]
    pub ui_amount: f64,
    /// Decimal places of the mint.
    #[prost(uint32, tag = "2")]
    pub decimals: u32,
    /// Raw amount as a decimal string.
    #[prost(string, tag = "3")]
    pub amount: String,
    /// `ui_amount` as a string, without rounding.
    #[prost(string, tag = "4")]
    pub ui_amount_string: String,
}

/// Data returned by the last program invoked.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnData {
    /// Program that set the data.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "base58::serialize")]
    pub program_id: Vec<u8>,
    /// Returned bytes.
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "base58::serialize")]
    pub data: Vec<u8>,
}

/// A reward credited to an account.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Rewarded account.
    #[prost(string, tag = "1")]
    pub pubkey: String,
    /// Balance change, negative for rent collected.
    #[prost(int64, tag = "2")]
    pub lamports: i64,
    /// Balance after the reward was applied.
    #[prost(uint64, tag = "3")]
    pub post_balance: u64,
    /// A [`RewardType`] value.
    #[prost(enumeration = "RewardType", tag = "4")]
    #[serde(serialize_with = "serialize_reward_type")]
    pub reward_type: i32,
    /// Vote account commission, empty when not applicable.
    #[prost(string, tag = "5")]
    pub commission: String,
}

/// Seconds since the Unix epoch.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct UnixTimestamp {
    /// Seconds since the Unix epoch.
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
}

/// Number of blocks beneath this one.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeight {
    /// Height.
    #[prost(uint64, tag = "1")]
    pub block_height: u64,
}

/// Kind of a reward entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RewardType {
    /// Type not reported.
    Unspecified = 0,
    /// Share of transaction fees.
    Fee = 1,
    /// Rent collected or distributed.
    Rent = 2,
    /// Staking inflation reward.
    Staking = 3,
    /// Vote account inflation reward.
    Voting = 4,
}

impl RewardType {
    /// Parses the reward type names used by the Solana JSON-RPC API.
    pub fn from_rpc_name(name: &str) -> Self {
        match name {
            "Fee" | "fee" => Self::Fee,
            "Rent" | "rent" => Self::Rent,
            "Staking" | "staking" => Self::Staking,
            "Voting" | "voting" => Self::Voting,
            _ => Self::Unspecified,
        }
    }

    fn as_str_name(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Fee => "Fee",
            Self::Rent => "Rent",
            Self::Staking => "Staking",
            Self::Voting => "Voting",
        }
    }
}

fn serialize_reward_type<S>(value: &i32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match RewardType::try_from(*value) {
        Ok(kind) => serializer.serialize_str(kind.as_str_name()),
        Err(_) => serializer.serialize_i32(*value),
    }
}

/// Base58 rendering for byte fields; keys and signatures read the way
/// every Solana explorer shows them.
mod base58 {
    use serde::{Serializer, ser::SerializeSeq};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&bs58::encode(bytes).into_string())
    }

    pub fn serialize_all<S>(values: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&bs58::encode(value).into_string())?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use prost::Message as _;

    use super::*;
    use crate::test_helpers::{BlockRecordBuilder, TransactionRecordBuilder};

    #[test]
    fn test_block_record_protobuf_roundtrip_preserves_logs() {
        let block = BlockRecordBuilder::new()
            .sequence(42)
            .parent_sequence(41)
            .transaction(TransactionRecordBuilder::new().fee(5000).log("Program log: hi").build())
            .build();

        let bytes = block.encode_to_vec();
        let decoded = BlockRecord::decode(bytes.as_slice()).unwrap();

        assert_eq!(decoded, block);
        assert_eq!(decoded.transactions[0].meta.as_ref().unwrap().log_messages, vec![
            "Program log: hi".to_string()
        ]);
    }

    #[test]
    fn test_slot_uses_firehose_field_number() {
        // Field 20, varint: key = (20 << 3) | 0 = 160 -> [0xa0, 0x01].
        let block = BlockRecord { sequence: 7, ..Default::default() };
        assert_eq!(block.encode_to_vec(), vec![0xa0, 0x01, 0x07]);
    }

    #[test]
    fn test_json_uses_solana_field_names() {
        let block = BlockRecordBuilder::new()
            .sequence(10)
            .parent_sequence(9)
            .content_hash("hash-10")
            .reward(Reward {
                pubkey: "validator".into(),
                lamports: 10,
                reward_type: RewardType::Fee as i32,
                ..Default::default()
            })
            .build();

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["slot"], 10);
        assert_eq!(json["parentSlot"], 9);
        assert_eq!(json["blockhash"], "hash-10");
        assert_eq!(json["rewards"][0]["rewardType"], "Fee");
    }

    #[test]
    fn test_byte_fields_serialize_as_base58() {
        let tx = Transaction { signatures: vec![vec![0, 0, 1]], message: None };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["signatures"][0], "112");
    }

    #[test]
    fn test_reward_type_from_rpc_name() {
        assert_eq!(RewardType::from_rpc_name("Staking"), RewardType::Staking);
        assert_eq!(RewardType::from_rpc_name("voting"), RewardType::Voting);
        assert_eq!(RewardType::from_rpc_name("something"), RewardType::Unspecified);
    }
}
