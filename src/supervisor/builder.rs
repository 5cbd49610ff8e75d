//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use tokio_util::sync::CancellationToken;

use super::{Supervisor, SupervisorError};
use crate::{
    config::AppConfig,
    engine::Comparator,
    notification::Notifier,
    persistence::traits::ArtifactStore,
    providers::traits::{PointSource, StreamingSource},
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    streaming_source: Option<Box<dyn StreamingSource>>,
    point_source: Option<Box<dyn PointSource>>,
    artifact_store: Option<Box<dyn ArtifactStore>>,
    notifier: Option<Box<dyn Notifier>>,
    cancellation_token: Option<CancellationToken>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the streaming source (e.g., Firehose) for the `Supervisor`.
    pub fn streaming_source(mut self, source: Box<dyn StreamingSource>) -> Self {
        self.streaming_source = Some(source);
        self
    }

    /// Sets the point-fetch source (e.g., JSON-RPC) for the `Supervisor`.
    pub fn point_source(mut self, source: Box<dyn PointSource>) -> Self {
        self.point_source = Some(source);
        self
    }

    /// Sets where divergence artifacts are written.
    pub fn artifact_store(mut self, store: Box<dyn ArtifactStore>) -> Self {
        self.artifact_store = Some(store);
        self
    }

    /// Sets how divergence alerts are delivered.
    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Uses an externally owned cancellation token instead of a fresh one.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let streaming = self.streaming_source.ok_or(SupervisorError::MissingStreamingSource)?;
        let point = self.point_source.ok_or(SupervisorError::MissingPointSource)?;
        let artifacts = self.artifact_store.ok_or(SupervisorError::MissingArtifactStore)?;
        let notifier = self.notifier.ok_or(SupervisorError::MissingNotifier)?;

        if config.interval.is_zero() {
            return Err(SupervisorError::InvalidConfiguration(
                "interval must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(
            streaming = streaming.label(),
            point = point.label(),
            interval = ?config.interval,
            fetch_timeout = ?config.fetch_timeout,
            "Assembling supervisor."
        );
        let comparator = Comparator::new(&config, streaming, point, artifacts, notifier);

        Ok(Supervisor::new(
            config.interval,
            comparator,
            self.cancellation_token.unwrap_or_default(),
        ))
    }
}
