//! Configuration module for the tracker.

mod app_config;
mod helpers;
mod http_base;
mod notifier;
mod sources;

pub use app_config::{AppConfig, AppConfigBuilder, ENV_PREFIX};
pub use helpers::{deserialize_duration_from_seconds, parse_interval, serialize_duration_to_seconds};
pub use http_base::BaseHttpClientConfig;
pub use notifier::{NotifierConfig, NotifierKind};
pub use sources::{
    FIREHOSE_API_KEY_ENV, FIREHOSE_API_TOKEN_ENV, FirehoseAuth, FirehoseConfig, RpcConfig,
};
