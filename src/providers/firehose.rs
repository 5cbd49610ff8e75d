//! The streaming source: a StreamingFast Firehose gRPC endpoint.
//!
//! A single channel is opened at startup and reused by every cycle. Each
//! call opens a server stream starting at the chain head and keeps only the
//! first block it yields.

use async_trait::async_trait;
use prost::Message as _;
use tonic::{
    client::Grpc,
    codec::{CompressionEncoding, ProstCodec},
    codegen::http::uri::PathAndQuery,
    metadata::{AsciiMetadataValue, MetadataKey},
    transport::{Channel, ClientTlsConfig, Endpoint},
};

use super::traits::{DataSourceError, StreamingSource};
use crate::{
    config::{FirehoseAuth, FirehoseConfig},
    models::BlockRecord,
};

const BLOCKS_PATH: &str = "/sf.firehose.v2.Stream/Blocks";
const SOLANA_BLOCK_TYPE: &str = "sf.solana.type.v1.Block";

/// `sf.firehose.v2.Request`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FirehoseRequest {
    /// Negative values are relative to the chain head.
    #[prost(int64, tag = "1")]
    pub start_block_num: i64,
    /// Resumes from a previous response; empty starts fresh.
    #[prost(string, tag = "2")]
    pub cursor: String,
    /// Zero streams forever.
    #[prost(uint64, tag = "3")]
    pub stop_block_num: u64,
    /// Restricts the stream to irreversible blocks.
    #[prost(bool, tag = "4")]
    pub final_blocks_only: bool,
    /// Server-side filters; unused here.
    #[prost(message, repeated, tag = "10")]
    pub transforms: Vec<::prost_types::Any>,
}

impl FirehoseRequest {
    /// Asks for the newest block, including non-final ones.
    pub fn head() -> Self {
        Self { start_block_num: -1, stop_block_num: 0, final_blocks_only: false, ..Default::default() }
    }
}

/// `sf.firehose.v2.Response`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FirehoseResponse {
    /// The chain-specific block, packed as `Any`.
    #[prost(message, optional, tag = "1")]
    pub block: Option<::prost_types::Any>,
    /// Fork step of the block (new, undo, final).
    #[prost(int32, tag = "6")]
    pub step: i32,
    /// Position to resume from after this block.
    #[prost(string, tag = "10")]
    pub cursor: String,
}

/// Decodes the block carried by a Firehose response.
pub fn decode_response(response: FirehoseResponse) -> Result<BlockRecord, DataSourceError> {
    let payload = response.block.ok_or(DataSourceError::EmptyPayload)?;
    if payload.value.is_empty() {
        return Err(DataSourceError::EmptyPayload);
    }
    if !payload.type_url.is_empty() && !payload.type_url.ends_with(SOLANA_BLOCK_TYPE) {
        return Err(DataSourceError::Decode(format!(
            "unexpected payload type '{}'",
            payload.type_url
        )));
    }
    BlockRecord::decode(payload.value.as_slice())
        .map_err(|e| DataSourceError::Decode(format!("failed to unmarshal Solana block: {e}")))
}

/// A `StreamingSource` backed by a Firehose endpoint.
pub struct FirehoseSource {
    channel: Channel,
    auth: FirehoseAuth,
    max_message_size: usize,
}

impl FirehoseSource {
    /// Opens the gRPC channel.
    ///
    /// Called once at startup; a failure here is fatal for the process.
    #[tracing::instrument(skip(config, auth), fields(endpoint = %config.uri(), auth = auth.scheme()))]
    pub async fn connect(
        config: &FirehoseConfig,
        auth: FirehoseAuth,
    ) -> Result<Self, DataSourceError> {
        let uri = config.uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| DataSourceError::Connection(format!("invalid endpoint {uri}: {e}")))?;
        if uri.starts_with("https://") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| DataSourceError::Connection(format!("TLS configuration: {e}")))?;
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| DataSourceError::Connection(format!("failed to connect to {uri}: {e}")))?;
        tracing::info!("Connected to Firehose.");

        Ok(Self::from_channel(channel, auth, config.max_message_size))
    }

    /// Wraps an already established channel.
    pub fn from_channel(channel: Channel, auth: FirehoseAuth, max_message_size: usize) -> Self {
        Self { channel, auth, max_message_size }
    }

    fn build_request(&self) -> Result<tonic::Request<FirehoseRequest>, DataSourceError> {
        authorize(tonic::Request::new(FirehoseRequest::head()), &self.auth)
    }
}

/// Attaches the configured credentials to `request`.
pub fn authorize<T>(
    mut request: tonic::Request<T>,
    auth: &FirehoseAuth,
) -> Result<tonic::Request<T>, DataSourceError> {
    let (key, value) = match auth {
        FirehoseAuth::Token(token) => ("authorization", format!("Bearer {token}")),
        FirehoseAuth::ApiKey(key) => ("x-api-key", key.clone()),
        FirehoseAuth::None => return Ok(request),
    };
    let value: AsciiMetadataValue = value
        .parse()
        .map_err(|e| DataSourceError::Connection(format!("invalid {key} credential: {e}")))?;
    request.metadata_mut().insert(MetadataKey::from_static(key), value);
    Ok(request)
}

#[async_trait]
impl StreamingSource for FirehoseSource {
    fn label(&self) -> &'static str {
        "firehose"
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_latest(&self) -> Result<BlockRecord, DataSourceError> {
        let mut client = Grpc::new(self.channel.clone())
            .max_decoding_message_size(self.max_message_size)
            .max_encoding_message_size(self.max_message_size)
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd);
        client.ready().await.map_err(|e| DataSourceError::Transport(Box::new(e)))?;

        let codec = ProstCodec::<FirehoseRequest, FirehoseResponse>::default();
        let mut stream = client
            .server_streaming(self.build_request()?, PathAndQuery::from_static(BLOCKS_PATH), codec)
            .await
            .map_err(|status| DataSourceError::Transport(Box::new(status)))?
            .into_inner();

        let response = stream
            .message()
            .await
            .map_err(|status| DataSourceError::Transport(Box::new(status)))?
            .ok_or(DataSourceError::EmptyPayload)?;

        let block = decode_response(response)?;
        tracing::debug!(sequence = block.sequence, "Received head block from Firehose.");
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{BlockRecordBuilder, TransactionRecordBuilder};

    fn any_block(block: &BlockRecord) -> ::prost_types::Any {
        ::prost_types::Any {
            type_url: format!("type.googleapis.com/{SOLANA_BLOCK_TYPE}"),
            value: block.encode_to_vec(),
        }
    }

    #[test]
    fn test_head_request() {
        let request = FirehoseRequest::head();
        assert_eq!(request.start_block_num, -1);
        assert_eq!(request.stop_block_num, 0);
        assert!(!request.final_blocks_only);
    }

    #[test]
    fn test_decode_response_success() {
        let block = BlockRecordBuilder::new()
            .sequence(250_000_000)
            .parent_sequence(249_999_999)
            .transaction(TransactionRecordBuilder::new().fee(5000).log("Program log: x").build())
            .build();
        let response = FirehoseResponse { block: Some(any_block(&block)), ..Default::default() };

        let decoded = decode_response(response).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_decode_response_missing_block() {
        let result = decode_response(FirehoseResponse::default());
        assert!(matches!(result, Err(DataSourceError::EmptyPayload)));
    }

    #[test]
    fn test_decode_response_empty_value() {
        let response = FirehoseResponse {
            block: Some(::prost_types::Any {
                type_url: format!("type.googleapis.com/{SOLANA_BLOCK_TYPE}"),
                value: vec![],
            }),
            ..Default::default()
        };
        assert!(matches!(decode_response(response), Err(DataSourceError::EmptyPayload)));
    }

    #[test]
    fn test_decode_response_wrong_type() {
        let block = BlockRecordBuilder::new().sequence(1).build();
        let mut payload = any_block(&block);
        payload.type_url = "type.googleapis.com/sf.ethereum.type.v2.Block".into();

        let result = decode_response(FirehoseResponse { block: Some(payload), ..Default::default() });
        assert!(matches!(result, Err(DataSourceError::Decode(msg)) if msg.contains("unexpected payload")));
    }

    #[test]
    fn test_decode_response_garbage_bytes() {
        let response = FirehoseResponse {
            block: Some(::prost_types::Any { type_url: String::new(), value: vec![0xff, 0xff, 0xff] }),
            ..Default::default()
        };
        assert!(matches!(decode_response(response), Err(DataSourceError::Decode(_))));
    }

    #[test]
    fn test_authorize_with_token() {
        let request = authorize(tonic::Request::new(()), &FirehoseAuth::Token("jwt".into())).unwrap();
        assert_eq!(request.metadata().get("authorization").unwrap(), "Bearer jwt");
        assert!(request.metadata().get("x-api-key").is_none());
    }

    #[test]
    fn test_authorize_with_api_key() {
        let request = authorize(tonic::Request::new(()), &FirehoseAuth::ApiKey("k".into())).unwrap();
        assert_eq!(request.metadata().get("x-api-key").unwrap(), "k");
        assert!(request.metadata().get("authorization").is_none());
    }

    #[test]
    fn test_authorize_without_credentials() {
        let request = authorize(tonic::Request::new(()), &FirehoseAuth::None).unwrap();
        assert!(request.metadata().is_empty());
    }

    #[test]
    fn test_authorize_rejects_non_ascii_credential() {
        let result = authorize(tonic::Request::new(()), &FirehoseAuth::ApiKey("bad\nkey".into()));
        assert!(matches!(result, Err(DataSourceError::Connection(_))));
    }
}
