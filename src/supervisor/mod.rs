//! The Supervisor module manages the lifecycle of the tracker.
//!
//! It owns the [`Comparator`] and drives it on a fixed interval:
//!
//! - **Scheduling**: one cycle immediately, then one per elapsed interval.
//!   A cycle is awaited to completion before the next tick is considered,
//!   and ticks missed while a cycle overran are delayed rather than bursted.
//! - **Graceful Shutdown**: it listens for shutdown signals (Ctrl+C or
//!   SIGTERM) through a cancellation token. The token is only observed
//!   between cycles, so an in-flight cycle always runs to completion.
//! - **Error isolation**: a failed cycle is logged and the loop continues.

mod builder;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::{signal, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::engine::{Comparator, CycleError, CycleReport};

/// Represents the set of errors that can occur while assembling or running
/// the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A streaming source was not provided to the `SupervisorBuilder`.
    #[error("Missing streaming source for Supervisor")]
    MissingStreamingSource,

    /// A point-fetch source was not provided to the `SupervisorBuilder`.
    #[error("Missing point-fetch source for Supervisor")]
    MissingPointSource,

    /// An artifact store was not provided to the `SupervisorBuilder`.
    #[error("Missing artifact store for Supervisor")]
    MissingArtifactStore,

    /// A notifier was not provided to the `SupervisorBuilder`.
    #[error("Missing notifier for Supervisor")]
    MissingNotifier,

    /// An error occurred due to an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    /// Time between two cycles.
    interval: std::time::Duration,

    /// The comparison engine driven by the scheduler.
    comparator: Comparator,

    /// A token used to request a graceful shutdown.
    cancellation_token: CancellationToken,
}

impl Supervisor {
    /// Creates a new Supervisor instance.
    ///
    /// This is typically called by the `SupervisorBuilder`.
    pub fn new(
        interval: std::time::Duration,
        comparator: Comparator,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self { interval, comparator, cancellation_token }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// A handle that stops the scheduler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Runs until SIGINT or SIGTERM is received.
    pub async fn run(self) -> Result<(), SupervisorError> {
        let cancellation_token = self.cancellation_token.clone();
        let signal_task = tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            cancellation_token.cancel();
        });

        let result = self.run_until_cancelled().await;
        signal_task.abort();
        result
    }

    /// Runs cycles until the cancellation token is triggered.
    pub async fn run_until_cancelled(mut self) -> Result<(), SupervisorError> {
        tracing::info!(interval = ?self.interval, "Starting comparison scheduler.");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Shutdown requested, stopping scheduler.");
                    break;
                }
                _ = ticker.tick() => {
                    cycles += 1;
                    log_cycle(cycles, self.comparator.run_cycle().await);
                }
            }
        }

        tracing::info!(cycles, last_compared = self.comparator.last_compared(), "Supervisor shutdown complete.");
        Ok(())
    }
}

fn log_cycle(cycle: u64, result: Result<CycleReport, CycleError>) {
    match result {
        Ok(CycleReport::Matched(outcome)) => {
            tracing::info!(cycle, sequence = outcome.sequence, "Cycle complete: sources agree.");
        }
        Ok(CycleReport::Diverged { outcome, artifact, notified }) => {
            tracing::warn!(
                cycle,
                sequence = outcome.sequence,
                streaming_path = %artifact.streaming_path.display(),
                point_path = %artifact.point_path.display(),
                notified,
                "Cycle complete: divergence detected."
            );
        }
        Ok(CycleReport::Stale { sequence }) => {
            tracing::info!(cycle, sequence, "Cycle complete: nothing new to compare.");
        }
        Err(e @ CycleError::SkippedPosition { .. }) => {
            tracing::warn!(cycle, error = %e, "Cycle aborted.");
        }
        Err(e) => {
            tracing::error!(cycle, error = %e, "Cycle failed.");
        }
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to register SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
        _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
    }
}
