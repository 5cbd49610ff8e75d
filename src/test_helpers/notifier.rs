use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    models::{ComparisonOutcome, DivergenceAlert, DivergenceArtifact, Fingerprint},
    notification::{Notifier, error::NotificationError},
};

/// A `Notifier` that keeps every alert it is handed.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<DivergenceAlert>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Creates a notifier whose deliveries succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that records the alert and then reports failure.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Alerts received so far.
    pub fn alerts(&self) -> Vec<DivergenceAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &DivergenceAlert) -> Result<(), NotificationError> {
        self.alerts.lock().unwrap().push(alert.clone());
        if self.fail {
            return Err(NotificationError::NotifyFailed("recording notifier set to fail".into()));
        }
        Ok(())
    }
}

/// Creates a `DivergenceAlert` for `sequence` with distinct fingerprints
/// and artifact paths in the working directory.
pub fn divergence_alert(sequence: u64) -> DivergenceAlert {
    let outcome = ComparisonOutcome::new(
        sequence,
        Fingerprint::from_bytes([0xaa; 32]),
        Fingerprint::from_bytes([0xbb; 32]),
    );
    let artifact = DivergenceArtifact {
        sequence,
        streaming_path: PathBuf::from(format!("firehose_block_{sequence}.json")),
        point_path: PathBuf::from(format!("rpc_fetcher_block_{sequence}.json")),
    };
    DivergenceAlert::new(&outcome, &artifact)
}
