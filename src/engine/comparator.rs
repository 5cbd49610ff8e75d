//! One comparison cycle: fetch, canonicalize, fingerprint, compare, report.

use std::{future::Future, time::Duration};

use thiserror::Error;

use super::{
    canonicalizer::canonicalize,
    fingerprint::{FingerprintError, fingerprint},
};
use crate::{
    config::AppConfig,
    models::{BlockRecord, ComparisonOutcome, DivergenceAlert, DivergenceArtifact, Fingerprint},
    notification::Notifier,
    persistence::{error::PersistenceError, traits::ArtifactStore},
    providers::traits::{DataSourceError, Fetched, PointSource, StreamingSource},
};

fn at_sequence(sequence: &Option<u64>) -> String {
    sequence.map(|s| format!(" at sequence {s}")).unwrap_or_default()
}

/// A recoverable failure that ends the current cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// A source call failed.
    #[error("Failed to fetch from {label}{}: {error}", at_sequence(.sequence))]
    Fetch {
        /// The source that failed.
        label: &'static str,
        /// The requested sequence, for point fetches.
        sequence: Option<u64>,
        /// The underlying error.
        #[source]
        error: DataSourceError,
    },

    /// A source call did not finish within the fetch deadline.
    #[error("{label} call exceeded its {timeout:?} deadline{}", at_sequence(.sequence))]
    DeadlineExceeded {
        /// The source that timed out.
        label: &'static str,
        /// The requested sequence, for point fetches.
        sequence: Option<u64>,
        /// The deadline that expired.
        timeout: Duration,
    },

    /// The point-fetch source has no block at the streaming head's sequence.
    #[error("{label} reports sequence {sequence} as skipped")]
    SkippedPosition {
        /// The source that reported the skip.
        label: &'static str,
        /// The skipped sequence.
        sequence: u64,
    },

    /// A record could not be fingerprinted.
    #[error("Failed to fingerprint {label} record: {error}")]
    Fingerprint {
        /// The source whose record failed.
        label: &'static str,
        /// The underlying error.
        #[source]
        error: FingerprintError,
    },

    /// The divergence artifacts could not be written.
    #[error("Failed to write divergence artifacts: {0}")]
    Artifact(#[from] PersistenceError),
}

/// What a successful cycle found.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    /// Both sources agree on the sequence.
    Matched(ComparisonOutcome),
    /// The sources disagree; artifacts were written and an alert attempted.
    Diverged {
        /// The comparison result.
        outcome: ComparisonOutcome,
        /// Where both records were written.
        artifact: DivergenceArtifact,
        /// Whether the alert was delivered.
        notified: bool,
    },
    /// The streaming head has not moved past the last compared sequence.
    Stale {
        /// The head sequence reported by the streaming source.
        sequence: u64,
    },
}

/// Drives comparison cycles between a streaming and a point-fetch source.
///
/// Holds the only handles to both sources, the artifact store and the
/// notifier. Cycles run one at a time through `&mut self`.
pub struct Comparator {
    streaming: Box<dyn StreamingSource>,
    point: Box<dyn PointSource>,
    artifacts: Box<dyn ArtifactStore>,
    notifier: Box<dyn Notifier>,
    fetch_timeout: Duration,
    notification_timeout: Duration,
    last_compared: Option<u64>,
}

impl Comparator {
    /// Creates a comparator using the deadlines from `config`.
    pub fn new(
        config: &AppConfig,
        streaming: Box<dyn StreamingSource>,
        point: Box<dyn PointSource>,
        artifacts: Box<dyn ArtifactStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            streaming,
            point,
            artifacts,
            notifier,
            fetch_timeout: config.fetch_timeout,
            notification_timeout: config.notification_timeout,
            last_compared: None,
        }
    }

    /// The last sequence both sources were compared at.
    pub fn last_compared(&self) -> Option<u64> {
        self.last_compared
    }

    /// Runs a single cycle.
    ///
    /// The sequence always comes from the streaming source. The point-fetch
    /// source is only queried once the head has moved past the last
    /// compared sequence.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let streaming_label = self.streaming.label();
        let point_label = self.point.label();

        let streaming_record = with_deadline(
            self.fetch_timeout,
            streaming_label,
            None,
            self.streaming.fetch_latest(),
        )
        .await?;
        let sequence = streaming_record.sequence;
        tracing::info!(source = streaming_label, sequence, "Fetched head block.");

        if self.last_compared.is_some_and(|last| sequence <= last) {
            tracing::info!(
                sequence,
                last_compared = self.last_compared,
                "Head has not advanced since the last comparison."
            );
            return Ok(CycleReport::Stale { sequence });
        }

        let fetched = with_deadline(
            self.fetch_timeout,
            point_label,
            Some(sequence),
            self.point.fetch_by_sequence(sequence),
        )
        .await?;
        let point_record = match fetched {
            Fetched::Block(block) => block,
            Fetched::Skipped => {
                return Err(CycleError::SkippedPosition { label: point_label, sequence });
            }
        };
        tracing::info!(
            source = point_label,
            sequence,
            transactions = point_record.transactions.len(),
            "Fetched block by sequence."
        );

        let fingerprint_a = fingerprint_of(streaming_label, &streaming_record)?;
        let fingerprint_b = fingerprint_of(point_label, &point_record)?;
        let outcome = ComparisonOutcome::new(sequence, fingerprint_a, fingerprint_b);
        self.last_compared = Some(sequence);

        if outcome.matched {
            tracing::info!(sequence, fingerprint = %fingerprint_a, "Checksums are equal.");
            return Ok(CycleReport::Matched(outcome));
        }

        tracing::warn!(
            sequence,
            streaming_fingerprint = %fingerprint_a,
            point_fingerprint = %fingerprint_b,
            "Checksums are different, writing blocks to JSON files."
        );
        let artifact = DivergenceArtifact {
            sequence,
            streaming_path: self
                .artifacts
                .write_record(streaming_label, sequence, &streaming_record)
                .await?,
            point_path: self.artifacts.write_record(point_label, sequence, &point_record).await?,
        };

        let alert = DivergenceAlert::new(&outcome, &artifact);
        let notified = self.deliver(&alert).await;

        Ok(CycleReport::Diverged { outcome, artifact, notified })
    }

    async fn deliver(&self, alert: &DivergenceAlert) -> bool {
        match tokio::time::timeout(self.notification_timeout, self.notifier.notify(alert)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, sequence = alert.sequence, "Failed to send divergence notification.");
                false
            }
            Err(_) => {
                tracing::error!(
                    sequence = alert.sequence,
                    timeout = ?self.notification_timeout,
                    "Divergence notification timed out."
                );
                false
            }
        }
    }
}

async fn with_deadline<T>(
    timeout: Duration,
    label: &'static str,
    sequence: Option<u64>,
    call: impl Future<Output = Result<T, DataSourceError>>,
) -> Result<T, CycleError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(|error| CycleError::Fetch { label, sequence, error }),
        Err(_) => Err(CycleError::DeadlineExceeded { label, sequence, timeout }),
    }
}

fn fingerprint_of(
    label: &'static str,
    record: &BlockRecord,
) -> Result<Fingerprint, CycleError> {
    fingerprint(&canonicalize(record)).map_err(|error| CycleError::Fingerprint { label, error })
}
