//! A set of helpers for testing

mod block;
mod notifier;
mod sources;

pub use block::{BlockRecordBuilder, TransactionRecordBuilder};
pub use notifier::{RecordingNotifier, divergence_alert};
pub use sources::{RecordingPointSource, ScriptedStreamingSource};
