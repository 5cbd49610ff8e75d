//! JSON-RPC wire types for `getBlock` and their conversion into
//! [`BlockRecord`].
//!
//! Requests use `"encoding": "json"`, so keys, signatures and instruction
//! data arrive base58-encoded and are decoded back to raw bytes to match
//! what Firehose carries. Transaction errors are re-encoded to bincode by
//! [`encode_transaction_error`].

use base64::Engine as _;
use serde::Deserialize;

use super::{traits::DataSourceError, tx_error::encode_transaction_error};
use crate::models::block::{
    BlockHeight, BlockRecord, CompiledInstruction, InnerInstruction, InnerInstructions, Message,
    MessageAddressTableLookup, MessageHeader, ReturnData, Reward, RewardType, TokenBalance,
    Transaction, TransactionError, TransactionMeta, TransactionRecord, UiTokenAmount,
    UnixTimestamp,
};

/// RPC error code: the slot was skipped or lost to a snapshot jump.
pub const SLOT_SKIPPED: i64 = -32007;
/// RPC error code: the slot was skipped or is missing in long-term storage.
pub const LONG_TERM_STORAGE_SLOT_SKIPPED: i64 = -32009;

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Whether the error means "there is no block at this slot".
    pub fn is_skipped_slot(&self) -> bool {
        matches!(self.code, SLOT_SKIPPED | LONG_TERM_STORAGE_SLOT_SKIPPED)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub blockhash: String,
    pub previous_blockhash: String,
    pub parent_slot: u64,
    #[serde(default)]
    pub transactions: Vec<RpcTransactionWithMeta>,
    #[serde(default)]
    pub rewards: Option<Vec<RpcReward>>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub block_height: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RpcTransactionWithMeta {
    pub transaction: RpcTransaction,
    #[serde(default)]
    pub meta: Option<RpcMeta>,
    /// `"legacy"` or a version number.
    #[serde(default)]
    pub version: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RpcTransaction {
    pub signatures: Vec<String>,
    pub message: RpcMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcMessage {
    pub header: RpcHeader,
    pub account_keys: Vec<String>,
    pub recent_blockhash: String,
    pub instructions: Vec<RpcInstruction>,
    #[serde(default)]
    pub address_table_lookups: Option<Vec<RpcAddressTableLookup>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcHeader {
    pub num_required_signatures: u32,
    pub num_readonly_signed_accounts: u32,
    pub num_readonly_unsigned_accounts: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcInstruction {
    pub program_id_index: u32,
    pub accounts: Vec<u8>,
    pub data: String,
    #[serde(default)]
    pub stack_height: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcAddressTableLookup {
    pub account_key: String,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcMeta {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    pub fee: u64,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<RpcInnerInstructions>>,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
    #[serde(default)]
    pub pre_token_balances: Option<Vec<RpcTokenBalance>>,
    #[serde(default)]
    pub post_token_balances: Option<Vec<RpcTokenBalance>>,
    #[serde(default)]
    pub rewards: Option<Vec<RpcReward>>,
    #[serde(default)]
    pub loaded_addresses: Option<RpcLoadedAddresses>,
    #[serde(default)]
    pub return_data: Option<RpcReturnData>,
    #[serde(default)]
    pub compute_units_consumed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RpcInnerInstructions {
    pub index: u32,
    pub instructions: Vec<RpcInstruction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTokenBalance {
    pub account_index: u32,
    pub mint: String,
    pub ui_token_amount: RpcUiTokenAmount,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub program_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcUiTokenAmount {
    #[serde(default)]
    pub ui_amount: Option<f64>,
    pub decimals: u32,
    pub amount: String,
    #[serde(default)]
    pub ui_amount_string: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReward {
    pub pubkey: String,
    pub lamports: i64,
    pub post_balance: u64,
    #[serde(default)]
    pub reward_type: Option<String>,
    #[serde(default)]
    pub commission: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RpcLoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReturnData {
    pub program_id: String,
    /// `[payload, encoding]`, always base64 in practice.
    pub data: (String, String),
}

fn decode_b58(field: &str, value: &str) -> Result<Vec<u8>, DataSourceError> {
    bs58::decode(value)
        .into_vec()
        .map_err(|e| DataSourceError::Decode(format!("{field}: invalid base58 '{value}': {e}")))
}

fn decode_b58_all(field: &str, values: &[String]) -> Result<Vec<Vec<u8>>, DataSourceError> {
    values.iter().map(|v| decode_b58(field, v)).collect()
}

impl RpcBlock {
    /// Converts the RPC block into the shared record for `slot`.
    pub fn into_record(self, slot: u64) -> Result<BlockRecord, DataSourceError> {
        let transactions = self
            .transactions
            .into_iter()
            .map(RpcTransactionWithMeta::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BlockRecord {
            parent_content_hash: self.previous_blockhash,
            content_hash: self.blockhash,
            parent_sequence: self.parent_slot,
            transactions,
            rewards: convert_rewards(self.rewards),
            block_time: self.block_time.map(|timestamp| UnixTimestamp { timestamp }),
            block_height: self.block_height.map(|block_height| BlockHeight { block_height }),
            sequence: slot,
        })
    }
}

impl RpcTransactionWithMeta {
    fn into_record(self) -> Result<TransactionRecord, DataSourceError> {
        let versioned = matches!(self.version, Some(serde_json::Value::Number(_)));
        let message = self.transaction.message.into_message(versioned)?;
        let transaction = Transaction {
            signatures: decode_b58_all("signatures", &self.transaction.signatures)?,
            message: Some(message),
        };
        let meta = self.meta.map(RpcMeta::into_meta).transpose()?;
        Ok(TransactionRecord { transaction: Some(transaction), meta })
    }
}

impl RpcMessage {
    fn into_message(self, versioned: bool) -> Result<Message, DataSourceError> {
        let instructions = self
            .instructions
            .into_iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: ix.program_id_index,
                    accounts: ix.accounts,
                    data: decode_b58("instruction data", &ix.data)?,
                })
            })
            .collect::<Result<Vec<_>, DataSourceError>>()?;

        let address_table_lookups = self
            .address_table_lookups
            .unwrap_or_default()
            .into_iter()
            .map(|lookup| {
                Ok(MessageAddressTableLookup {
                    account_key: decode_b58("address table", &lookup.account_key)?,
                    writable_indexes: lookup.writable_indexes,
                    readonly_indexes: lookup.readonly_indexes,
                })
            })
            .collect::<Result<Vec<_>, DataSourceError>>()?;

        Ok(Message {
            header: Some(MessageHeader {
                num_required_signatures: self.header.num_required_signatures,
                num_readonly_signed_accounts: self.header.num_readonly_signed_accounts,
                num_readonly_unsigned_accounts: self.header.num_readonly_unsigned_accounts,
            }),
            account_keys: decode_b58_all("account keys", &self.account_keys)?,
            recent_blockhash: decode_b58("recent blockhash", &self.recent_blockhash)?,
            instructions,
            versioned,
            address_table_lookups,
        })
    }
}

impl RpcMeta {
    fn into_meta(self) -> Result<TransactionMeta, DataSourceError> {
        let err = self
            .err
            .map(|err| encode_transaction_error(err).map(|err| TransactionError { err }))
            .transpose()?;

        let inner_instructions_none = self.inner_instructions.is_none();
        let inner_instructions = self
            .inner_instructions
            .unwrap_or_default()
            .into_iter()
            .map(|inner| {
                let instructions = inner
                    .instructions
                    .into_iter()
                    .map(|ix| {
                        Ok(InnerInstruction {
                            program_id_index: ix.program_id_index,
                            accounts: ix.accounts,
                            data: decode_b58("inner instruction data", &ix.data)?,
                            stack_height: ix.stack_height,
                        })
                    })
                    .collect::<Result<Vec<_>, DataSourceError>>()?;
                Ok(InnerInstructions { index: inner.index, instructions })
            })
            .collect::<Result<Vec<_>, DataSourceError>>()?;

        let log_messages_none = self.log_messages.is_none();
        let return_data_none = self.return_data.is_none();
        let return_data = self
            .return_data
            .map(|rd| {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(&rd.data.0)
                    .map_err(|e| DataSourceError::Decode(format!("return data: {e}")))?;
                Ok::<_, DataSourceError>(ReturnData {
                    program_id: decode_b58("return data program", &rd.program_id)?,
                    data,
                })
            })
            .transpose()?;

        let loaded = self.loaded_addresses.unwrap_or_default();

        Ok(TransactionMeta {
            err,
            fee: self.fee,
            pre_balances: self.pre_balances,
            post_balances: self.post_balances,
            inner_instructions,
            log_messages: self.log_messages.unwrap_or_default(),
            pre_token_balances: convert_token_balances(self.pre_token_balances),
            post_token_balances: convert_token_balances(self.post_token_balances),
            rewards: convert_rewards(self.rewards),
            inner_instructions_none,
            log_messages_none,
            loaded_writable_addresses: decode_b58_all("loaded writable", &loaded.writable)?,
            loaded_readonly_addresses: decode_b58_all("loaded readonly", &loaded.readonly)?,
            return_data,
            return_data_none,
            compute_units_consumed: self.compute_units_consumed,
        })
    }
}

fn convert_token_balances(balances: Option<Vec<RpcTokenBalance>>) -> Vec<TokenBalance> {
    balances
        .unwrap_or_default()
        .into_iter()
        .map(|b| TokenBalance {
            account_index: b.account_index,
            mint: b.mint,
            ui_token_amount: Some(UiTokenAmount {
                ui_amount: b.ui_token_amount.ui_amount.unwrap_or_default(),
                decimals: b.ui_token_amount.decimals,
                amount: b.ui_token_amount.amount,
                ui_amount_string: b.ui_token_amount.ui_amount_string,
            }),
            owner: b.owner.unwrap_or_default(),
            program_id: b.program_id.unwrap_or_default(),
        })
        .collect()
}

fn convert_rewards(rewards: Option<Vec<RpcReward>>) -> Vec<Reward> {
    rewards
        .unwrap_or_default()
        .into_iter()
        .map(|r| Reward {
            pubkey: r.pubkey,
            lamports: r.lamports,
            post_balance: r.post_balance,
            reward_type: r
                .reward_type
                .as_deref()
                .map(RewardType::from_rpc_name)
                .unwrap_or(RewardType::Unspecified) as i32,
            commission: r.commission.map(|c| c.to_string()).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::{canonicalize, fingerprint};

    fn sample_block_json() -> serde_json::Value {
        json!({
            "blockhash": "3Eq21vXNB5s86c62bVuUfTeaMif1N2kUqRPBmGRJhyTA",
            "previousBlockhash": "mfcyqEXB3DnHXki6KjjmZck6YjmZLvpAByy2fj4nh6B",
            "parentSlot": 41,
            "blockTime": 1_700_000_000,
            "blockHeight": 38,
            "rewards": [
                { "pubkey": "Vote111111111111111111111111111111111111111", "lamports": 5000,
                  "postBalance": 100, "rewardType": "Fee", "commission": null }
            ],
            "transactions": [{
                "version": 0,
                "transaction": {
                    "signatures": ["1111111111111111111111111111111111111111111111111111111111111111"],
                    "message": {
                        "header": {
                            "numRequiredSignatures": 1,
                            "numReadonlySignedAccounts": 0,
                            "numReadonlyUnsignedAccounts": 1
                        },
                        "accountKeys": ["11111111111111111111111111111111"],
                        "recentBlockhash": "11111111111111111111111111111111",
                        "instructions": [{ "programIdIndex": 0, "accounts": [0], "data": "3Bxs4h24hBtQy9rw" }],
                        "addressTableLookups": []
                    }
                },
                "meta": {
                    "err": { "InstructionError": [0, { "Custom": 1 }] },
                    "fee": 5000,
                    "preBalances": [10000],
                    "postBalances": [5000],
                    "innerInstructions": [],
                    "logMessages": ["Program 11111111111111111111111111111111 invoke [1]"],
                    "preTokenBalances": [],
                    "postTokenBalances": [],
                    "rewards": [],
                    "loadedAddresses": { "writable": [], "readonly": [] },
                    "returnData": { "programId": "11111111111111111111111111111111", "data": ["AQID", "base64"] },
                    "computeUnitsConsumed": 150
                }
            }]
        })
    }

    #[test]
    fn test_rpc_block_into_record() {
        let block: RpcBlock = serde_json::from_value(sample_block_json()).unwrap();
        let record = block.into_record(42).unwrap();

        assert_eq!(record.sequence, 42);
        assert_eq!(record.parent_sequence, 41);
        assert_eq!(record.content_hash, "3Eq21vXNB5s86c62bVuUfTeaMif1N2kUqRPBmGRJhyTA");
        assert_eq!(record.block_time.unwrap().timestamp, 1_700_000_000);
        assert_eq!(record.block_height.unwrap().block_height, 38);
        assert_eq!(record.rewards[0].reward_type, RewardType::Fee as i32);

        let tx = &record.transactions[0];
        let message = tx.transaction.as_ref().unwrap().message.as_ref().unwrap();
        assert!(message.versioned);
        assert_eq!(message.account_keys[0], vec![0u8; 32]);
        assert_eq!(tx.transaction.as_ref().unwrap().signatures[0], vec![0u8; 64]);

        let meta = tx.meta.as_ref().unwrap();
        assert_eq!(meta.fee, 5000);
        assert_eq!(meta.log_messages.len(), 1);
        assert!(!meta.log_messages_none);
        assert!(!meta.inner_instructions_none);
        assert_eq!(meta.return_data.as_ref().unwrap().data, vec![1, 2, 3]);
        assert_eq!(meta.compute_units_consumed, Some(150));
        assert_eq!(meta.err.as_ref().unwrap().err, vec![8, 0, 0, 0, 0, 25, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_failed_transaction_fingerprints_like_firehose_block() {
        let from_rpc = serde_json::from_value::<RpcBlock>(sample_block_json())
            .unwrap()
            .into_record(42)
            .unwrap();
        let mut from_firehose = from_rpc.clone();
        from_firehose.transactions[0].meta.as_mut().unwrap().err =
            Some(TransactionError { err: vec![8, 0, 0, 0, 0, 25, 0, 0, 0, 1, 0, 0, 0] });

        let rpc_fp = fingerprint(&canonicalize(&from_rpc)).unwrap();
        let firehose_fp = fingerprint(&canonicalize(&from_firehose)).unwrap();
        assert_eq!(rpc_fp, firehose_fp);
    }

    #[test]
    fn test_successful_transaction_has_no_error() {
        let mut json = sample_block_json();
        json["transactions"][0]["meta"]["err"] = json!(null);
        let record = serde_json::from_value::<RpcBlock>(json).unwrap().into_record(1).unwrap();

        assert!(record.transactions[0].meta.as_ref().unwrap().err.is_none());
    }

    #[test]
    fn test_error_response_without_result() {
        let response: RpcResponse<RpcBlock> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32007,"message":"skipped"}}"#,
        )
        .unwrap();

        assert!(response.result.is_none());
        assert!(response.error.unwrap().is_skipped_slot());
    }

    #[test]
    fn test_legacy_transaction_is_not_versioned() {
        let mut json = sample_block_json();
        json["transactions"][0]["version"] = json!("legacy");
        let record = serde_json::from_value::<RpcBlock>(json).unwrap().into_record(1).unwrap();

        let message = record.transactions[0].transaction.as_ref().unwrap().message.as_ref().unwrap();
        assert!(!message.versioned);
    }

    #[test]
    fn test_null_optional_meta_fields_set_none_flags() {
        let mut json = sample_block_json();
        json["transactions"][0]["meta"]["logMessages"] = json!(null);
        json["transactions"][0]["meta"]["innerInstructions"] = json!(null);
        json["transactions"][0]["meta"]["returnData"] = json!(null);
        let record = serde_json::from_value::<RpcBlock>(json).unwrap().into_record(1).unwrap();

        let meta = record.transactions[0].meta.as_ref().unwrap();
        assert!(meta.log_messages_none);
        assert!(meta.inner_instructions_none);
        assert!(meta.return_data_none);
        assert!(meta.return_data.is_none());
    }

    #[test]
    fn test_invalid_base58_is_decode_error() {
        let mut json = sample_block_json();
        json["transactions"][0]["transaction"]["signatures"] = json!(["not-base58-0OIl"]);
        let result = serde_json::from_value::<RpcBlock>(json).unwrap().into_record(1);

        assert!(matches!(result, Err(DataSourceError::Decode(msg)) if msg.contains("signatures")));
    }

    #[test]
    fn test_skipped_slot_codes() {
        let skipped = RpcError { code: SLOT_SKIPPED, message: "skipped".into() };
        let storage = RpcError { code: LONG_TERM_STORAGE_SLOT_SKIPPED, message: "gone".into() };
        let unavailable = RpcError { code: -32004, message: "not available".into() };

        assert!(skipped.is_skipped_slot());
        assert!(storage.is_skipped_slot());
        assert!(!unavailable.is_skipped_slot());
    }
}
