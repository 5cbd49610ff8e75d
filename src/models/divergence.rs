use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ComparisonOutcome, Fingerprint};

/// The files written for one divergent sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivergenceArtifact {
    /// The sequence at which the sources disagreed.
    pub sequence: u64,
    /// Original record as served by the streaming source.
    pub streaming_path: PathBuf,
    /// Original record as served by the point-fetch source.
    pub point_path: PathBuf,
}

/// The notification payload announcing a divergence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivergenceAlert {
    /// The divergent sequence.
    pub sequence: u64,
    /// Fingerprint of the streaming record.
    pub streaming_fingerprint: Fingerprint,
    /// Fingerprint of the point-fetched record.
    pub point_fingerprint: Fingerprint,
    /// Artifact written for the streaming record.
    pub streaming_path: PathBuf,
    /// Artifact written for the point-fetched record.
    pub point_path: PathBuf,
    /// When the mismatch was detected.
    pub detected_at: DateTime<Utc>,
}

impl DivergenceAlert {
    /// Builds the alert for a mismatched outcome and the artifacts written for it.
    pub fn new(outcome: &ComparisonOutcome, artifact: &DivergenceArtifact) -> Self {
        Self {
            sequence: outcome.sequence,
            streaming_fingerprint: outcome.fingerprint_a,
            point_fingerprint: outcome.fingerprint_b,
            streaming_path: artifact.streaming_path.clone(),
            point_path: artifact.point_path.clone(),
            detected_at: outcome.timestamp,
        }
    }
}
