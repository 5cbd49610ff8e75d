use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{
    BaseHttpClientConfig, FirehoseAuth, FirehoseConfig, NotifierConfig, RpcConfig,
    deserialize_duration_from_seconds,
};

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "QA_TRACKER";

/// Provides the default value for interval.
fn default_interval() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default value for fetch_timeout.
fn default_fetch_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default value for notification_timeout.
fn default_notification_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Provides the default value for artifact_dir.
fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Application configuration for the tracker.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Time between two comparison cycles.
    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub interval: Duration,

    /// Streaming source settings.
    #[serde(default)]
    pub firehose: FirehoseConfig,

    /// Credentials for the streaming source, read from the environment.
    #[serde(skip)]
    pub firehose_auth: FirehoseAuth,

    /// Point-fetch source settings.
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Alert delivery settings.
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Configuration for the base HTTP client.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,

    /// Deadline for each source call within a cycle.
    #[serde(
        default = "default_fetch_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub fetch_timeout: Duration,

    /// Deadline for delivering one alert.
    #[serde(
        default = "default_notification_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub notification_timeout: Duration,

    /// Directory receiving the divergence artifacts.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            firehose: FirehoseConfig::default(),
            firehose_auth: FirehoseAuth::None,
            rpc: RpcConfig::default(),
            notifier: NotifierConfig::default(),
            http_base_config: BaseHttpClientConfig::default(),
            fetch_timeout: default_fetch_timeout(),
            notification_timeout: default_notification_timeout(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig`.
    ///
    /// Settings are layered: built-in defaults, then `app.yaml` from
    /// `config_dir` (required when a directory is given, optional `configs/`
    /// otherwise), then `QA_TRACKER__*` environment variables. Firehose
    /// credentials always come from their dedicated environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let config_file = Path::new(config_dir_str).join("app.yaml");

        let s = Config::builder()
            .add_source(
                File::from(config_file.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(config_dir.is_some()),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;
        config.firehose_auth = FirehoseAuth::from_env();

        Ok(config)
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances in tests and embedders.
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Sets the time between two cycles.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Sets the deadline for each source call.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// Sets the deadline for delivering one alert.
    pub fn notification_timeout(mut self, timeout: Duration) -> Self {
        self.config.notification_timeout = timeout;
        self
    }

    /// Sets the directory receiving divergence artifacts.
    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.artifact_dir = dir.into();
        self
    }

    /// Sets the alert delivery settings.
    pub fn notifier(mut self, notifier: NotifierConfig) -> Self {
        self.config.notifier = notifier;
        self
    }

    /// Returns the configured `AppConfig`.
    pub fn build(self) -> AppConfig {
        self.config
    }
}
