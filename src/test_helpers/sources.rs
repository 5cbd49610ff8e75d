//! Scripted data sources that record how they are called.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    models::BlockRecord,
    providers::traits::{DataSourceError, Fetched, PointSource, StreamingSource},
};

/// A `StreamingSource` that replays a fixed script of results.
///
/// Once the script is exhausted every call fails with
/// `DataSourceError::EmptyPayload`. Calls are counted and can be delayed to
/// simulate a slow endpoint.
#[derive(Clone)]
pub struct ScriptedStreamingSource {
    label: &'static str,
    script: Arc<Mutex<VecDeque<Result<BlockRecord, DataSourceError>>>>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl ScriptedStreamingSource {
    /// Creates a source labelled `firehose` with an empty script.
    pub fn new() -> Self {
        Self {
            label: "firehose",
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Queues a successful head block.
    pub fn then_block(self, block: BlockRecord) -> Self {
        self.script.lock().unwrap().push_back(Ok(block));
        self
    }

    /// Queues a failure.
    pub fn then_error(self, error: DataSourceError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Makes every call sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `fetch_latest` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The highest number of `fetch_latest` calls ever in progress at once.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedStreamingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamingSource for ScriptedStreamingSource {
    fn label(&self) -> &'static str {
        self.label
    }

    async fn fetch_latest(&self) -> Result<BlockRecord, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Err(DataSourceError::EmptyPayload))
    }
}

/// A `PointSource` serving canned blocks and recording every requested
/// sequence.
///
/// Sequences without a canned answer are reported as skipped.
#[derive(Clone)]
pub struct RecordingPointSource {
    label: &'static str,
    blocks: Arc<Mutex<HashMap<u64, Fetched>>>,
    requested: Arc<Mutex<Vec<u64>>>,
    delay: Option<Duration>,
}

impl RecordingPointSource {
    /// Creates a source labelled `rpc_fetcher` with no canned blocks.
    pub fn new() -> Self {
        Self {
            label: "rpc_fetcher",
            blocks: Arc::new(Mutex::new(HashMap::new())),
            requested: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Serves `block` for its own sequence.
    pub fn with_block(self, block: BlockRecord) -> Self {
        self.blocks.lock().unwrap().insert(block.sequence, Fetched::Block(block));
        self
    }

    /// Reports `sequence` as a skipped position.
    pub fn with_skipped(self, sequence: u64) -> Self {
        self.blocks.lock().unwrap().insert(sequence, Fetched::Skipped);
        self
    }

    /// Makes every call sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sequences requested so far, in call order.
    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for RecordingPointSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PointSource for RecordingPointSource {
    fn label(&self) -> &'static str {
        self.label
    }

    async fn fetch_by_sequence(&self, sequence: u64) -> Result<Fetched, DataSourceError> {
        self.requested.lock().unwrap().push(sequence);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let answer = self.blocks.lock().unwrap().get(&sequence).cloned();
        Ok(answer.unwrap_or(Fetched::Skipped))
    }
}
