//! Divergence artifacts stored as pretty-printed JSON files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{error::PersistenceError, traits::ArtifactStore};
use crate::models::BlockRecord;

/// An `ArtifactStore` that writes one JSON file per record into a directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at `dir`. The directory is created on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the artifact for `(label, sequence)`.
    pub fn artifact_path(&self, label: &str, sequence: u64) -> PathBuf {
        self.dir.join(format!("{label}_block_{sequence}.json"))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    #[tracing::instrument(skip(self, record), level = "debug")]
    async fn write_record(
        &self,
        label: &str,
        sequence: u64,
        record: &BlockRecord,
    ) -> Result<PathBuf, PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::Io { path: self.dir.clone(), source })?;

        let path = self.artifact_path(label, sequence);
        let contents = render_artifact(record)?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| PersistenceError::Io { path: path.clone(), source })?;

        tracing::debug!(path = %path.display(), "Artifact written.");
        Ok(path)
    }
}

/// Renders `record` as indented JSON with unpopulated fields left out.
pub fn render_artifact(record: &BlockRecord) -> Result<String, PersistenceError> {
    let mut value = serde_json::to_value(record)?;
    prune_unpopulated(&mut value);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Drops object fields that carry no information: nulls, `false`, zeros,
/// empty strings and empty collections.
///
/// Array elements are kept as-is so indexes keep lining up with the
/// instruction and account positions they refer to.
fn prune_unpopulated(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for field in map.values_mut() {
                prune_unpopulated(field);
            }
            map.retain(|_, field| !is_unpopulated(field));
        }
        Value::Array(items) => items.iter_mut().for_each(prune_unpopulated),
        _ => {}
    }
}

fn is_unpopulated(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_helpers::{BlockRecordBuilder, TransactionRecordBuilder};

    #[test]
    fn test_prune_unpopulated_fields() {
        let mut value = json!({
            "slot": 42,
            "blockhash": "",
            "parentSlot": 0,
            "blockTime": null,
            "rewards": [],
            "nested": { "flag": false, "inner": {} },
            "kept": { "flag": true }
        });
        prune_unpopulated(&mut value);
        assert_eq!(value, json!({ "slot": 42, "kept": { "flag": true } }));
    }

    #[test]
    fn test_prune_keeps_array_elements() {
        let mut value = json!({ "balances": [0, 5, 0], "items": [{ "fee": 0 }] });
        prune_unpopulated(&mut value);
        assert_eq!(value, json!({ "balances": [0, 5, 0], "items": [{}] }));
    }

    #[test]
    fn test_render_artifact_keeps_logs_and_omits_defaults() {
        let block = BlockRecordBuilder::new()
            .sequence(42)
            .transaction(TransactionRecordBuilder::new().fee(5000).log("Program log: hello").build())
            .build();

        let rendered = render_artifact(&block).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["slot"], 42);
        assert!(value.get("rewards").is_none());
        assert!(value.get("blockTime").is_none());
        assert_eq!(value["transactions"][0]["meta"]["fee"], 5000);
        assert_eq!(value["transactions"][0]["meta"]["logMessages"][0], "Program log: hello");
        assert!(rendered.contains('\n'), "artifact should be pretty-printed");
    }

    #[tokio::test]
    async fn test_write_record_uses_label_and_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let block = BlockRecordBuilder::new().sequence(42).build();

        let path = store.write_record("firehose", 42, &block).await.unwrap();

        assert_eq!(path, dir.path().join("firehose_block_42.json"));
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["slot"], 42);
    }

    #[tokio::test]
    async fn test_write_record_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("artifacts").join("solana");
        let store = FsArtifactStore::new(&nested);

        let path = store
            .write_record("rpc_fetcher", 7, &BlockRecordBuilder::new().sequence(7).build())
            .await
            .unwrap();

        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_write_record_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store.write_record("firehose", 1, &BlockRecordBuilder::new().sequence(1).build()).await.unwrap();
        let second = BlockRecordBuilder::new().sequence(1).content_hash("second").build();
        let path = store.write_record("firehose", 1, &second).await.unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["blockhash"], "second");
    }

    #[tokio::test]
    async fn test_write_record_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let store = FsArtifactStore::new(&blocker);

        let result = store.write_record("firehose", 1, &BlockRecordBuilder::new().build()).await;
        assert!(matches!(result, Err(PersistenceError::Io { .. })));
    }
}
