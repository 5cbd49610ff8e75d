use std::{env, fmt};

use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable holding a bearer token for the Firehose endpoint.
pub const FIREHOSE_API_TOKEN_ENV: &str = "FIREHOSE_API_TOKEN";

/// Environment variable holding an API key for the Firehose endpoint.
pub const FIREHOSE_API_KEY_ENV: &str = "FIREHOSE_API_KEY";

fn default_firehose_endpoint() -> String {
    "mainnet.sol.streamingfast.io:443".to_string()
}

fn default_max_message_size() -> usize {
    // Solana blocks can be very large.
    1024 * 1024 * 1024
}

fn default_rpc_endpoint() -> Url {
    Url::parse("https://api.mainnet-beta.solana.com").expect("static URL is valid")
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

/// Connection settings for the streaming (Firehose) source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FirehoseConfig {
    /// `host:port` or full URI of the Firehose gRPC endpoint.
    #[serde(default = "default_firehose_endpoint")]
    pub endpoint: String,

    /// Connect without TLS when the endpoint has no scheme.
    #[serde(default)]
    pub plaintext: bool,

    /// Maximum size of a single decoded gRPC message.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl Default for FirehoseConfig {
    fn default() -> Self {
        Self {
            endpoint: default_firehose_endpoint(),
            plaintext: false,
            max_message_size: default_max_message_size(),
        }
    }
}

impl FirehoseConfig {
    /// Returns the endpoint as a URI, adding a scheme to bare `host:port`
    /// values.
    pub fn uri(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.plaintext {
            format!("http://{}", self.endpoint)
        } else {
            format!("https://{}", self.endpoint)
        }
    }
}

/// Credentials attached to every Firehose request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum FirehoseAuth {
    /// Sent as `authorization: Bearer <token>`.
    Token(String),
    /// Sent as `x-api-key: <key>`.
    ApiKey(String),
    /// Requests are sent unauthenticated.
    #[default]
    None,
}

impl FirehoseAuth {
    /// Picks the auth scheme from the two candidate credentials.
    ///
    /// The token wins when both are present; empty values count as absent.
    pub fn from_values(token: Option<String>, api_key: Option<String>) -> Self {
        let token = token.filter(|t| !t.is_empty());
        let api_key = api_key.filter(|k| !k.is_empty());
        match (token, api_key) {
            (Some(token), _) => Self::Token(token),
            (None, Some(key)) => Self::ApiKey(key),
            (None, None) => Self::None,
        }
    }

    /// Reads `FIREHOSE_API_TOKEN` and `FIREHOSE_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_values(env::var(FIREHOSE_API_TOKEN_ENV).ok(), env::var(FIREHOSE_API_KEY_ENV).ok())
    }

    /// A short description that never includes the secret.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Token(_) => "bearer-token",
            Self::ApiKey(_) => "api-key",
            Self::None => "none",
        }
    }
}

impl fmt::Debug for FirehoseAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FirehoseAuth({})", self.scheme())
    }
}

/// Settings for the point-fetch (JSON-RPC) source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RpcConfig {
    /// Solana JSON-RPC endpoint.
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: Url,

    /// Commitment level passed to `getBlock`.
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { endpoint: default_rpc_endpoint(), commitment: default_commitment() }
    }
}
