//! The point-fetch source: a Solana JSON-RPC node queried with `getBlock`.

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use super::{
    rpc_types::{RpcBlock, RpcResponse},
    traits::{DataSourceError, Fetched, PointSource},
};
use crate::config::RpcConfig;

/// A `PointSource` implementation backed by a Solana JSON-RPC endpoint.
pub struct RpcFetcherSource {
    client: reqwest::Client,
    endpoint: Url,
    commitment: String,
}

impl RpcFetcherSource {
    /// Creates a new `RpcFetcherSource` sharing the given HTTP client.
    #[tracing::instrument(skip(client), level = "debug")]
    pub fn new(client: reqwest::Client, config: &RpcConfig) -> Self {
        Self { client, endpoint: config.endpoint.clone(), commitment: config.commitment.clone() }
    }

    fn get_block_request(&self, slot: u64) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBlock",
            "params": [
                slot,
                {
                    "encoding": "json",
                    "transactionDetails": "full",
                    "rewards": true,
                    "maxSupportedTransactionVersion": 0,
                    "commitment": self.commitment,
                }
            ]
        })
    }
}

#[async_trait]
impl PointSource for RpcFetcherSource {
    fn label(&self) -> &'static str {
        "rpc_fetcher"
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_by_sequence(&self, sequence: u64) -> Result<Fetched, DataSourceError> {
        tracing::debug!(slot = sequence, "Fetching block from RPC.");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&self.get_block_request(sequence))
            .send()
            .await
            .map_err(|e| DataSourceError::Transport(Box::new(e)))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| DataSourceError::Transport(Box::new(e)))?;

        let parsed: RpcResponse<RpcBlock> = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(DataSourceError::Remote {
                    code: i64::from(status.as_u16()),
                    message: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Err(e) => {
                return Err(DataSourceError::Decode(format!("invalid getBlock response: {e}")));
            }
        };

        if let Some(error) = parsed.error {
            if error.is_skipped_slot() {
                tracing::info!(slot = sequence, code = error.code, "Slot has no block.");
                return Ok(Fetched::Skipped);
            }
            tracing::warn!(slot = sequence, code = error.code, message = %error.message, "RPC returned an error.");
            return Err(DataSourceError::Remote { code: error.code, message: error.message });
        }

        match parsed.result {
            Some(block) => {
                let record = block.into_record(sequence)?;
                tracing::debug!(
                    slot = sequence,
                    transactions = record.transactions.len(),
                    "Successfully fetched block from RPC."
                );
                Ok(Fetched::Block(record))
            }
            None => {
                tracing::info!(slot = sequence, "RPC returned no block for slot.");
                Ok(Fetched::Skipped)
            }
        }
    }
}
