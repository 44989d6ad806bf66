use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use taskboard_core::{StoreError, StoreResult};
use tokio::sync::RwLock;

use crate::atomic;
use crate::envelope::{record_key, Envelope};
use crate::traits::{Collection, RecordStore};

const POINTER_KEY: u64 = 1;

/// JSON file-backed record store.
///
/// The whole envelope is held in memory and rewritten atomically on every
/// transaction; a scratch copy is mutated first and only installed after
/// the file write succeeds, so a failed write leaves both disk and memory
/// unchanged. The write lock is held across mutate-and-write, which is what
/// serializes transactions.
#[derive(Debug)]
pub struct JsonFileGateway {
    path: PathBuf,
    state: RwLock<Envelope>,
}

impl JsonFileGateway {
    /// Idempotently open (or create) the store at `path` with the given
    /// schema version. Older envelopes are upgraded in place; a newer
    /// envelope is refused. IO failures surface as `StoreUnavailable`.
    pub async fn open(path: impl AsRef<Path>, version: u32) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
            }
        }

        let envelope = if path.exists() {
            let bytes = atomic::read_all(&path)
                .await
                .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
            let mut envelope: Envelope = serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

            if envelope.version > version {
                return Err(StoreError::StoreUnavailable(format!(
                    "store at {} has schema version {} but this build supports up to {}",
                    path.display(),
                    envelope.version,
                    version
                )));
            }

            let from_version = envelope.version;
            if envelope.ensure_schema(version) {
                let bytes = encode(&envelope)?;
                atomic::write_atomic(&path, &bytes)
                    .await
                    .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
                tracing::info!(
                    "upgraded store at {} from schema v{} to v{}",
                    path.display(),
                    from_version,
                    version
                );
            }
            envelope
        } else {
            let envelope = Envelope::empty(version);
            let bytes = encode(&envelope)?;
            atomic::write_atomic(&path, &bytes)
                .await
                .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
            tracing::info!("created store at {} (schema v{})", path.display(), version);
            envelope
        };

        Ok(Self {
            path,
            state: RwLock::new(envelope),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Secondary-index lookup: keys of boards carrying `name`.
    pub async fn find_keys_by_name(&self, name: &str) -> Vec<u64> {
        self.state.read().await.keys_by_name(name)
    }

    async fn commit(&self, envelope: &Envelope) -> StoreResult<()> {
        let bytes = encode(envelope)?;
        let written = atomic::write_atomic(&self.path, &bytes).await?;
        tracing::debug!("committed {written} bytes to {}", self.path.display());
        Ok(())
    }

    /// Assign a key if the record carries none, stamp it into the record,
    /// and insert. Shared by `add` and `add_and_select`.
    fn stage_add(
        scratch: &mut Envelope,
        collection: Collection,
        mut record: Value,
    ) -> StoreResult<u64> {
        if !record.is_object() {
            return Err(StoreError::Serialization(format!(
                "record for {collection} is not a JSON object"
            )));
        }
        let key = match record_key(&record) {
            Some(key) => {
                scratch.observe_key(collection, key);
                key
            }
            None => scratch.next_key(collection),
        };
        record["id"] = json!(key);
        scratch.insert(collection, key, record)?;
        Ok(key)
    }
}

#[async_trait]
impl RecordStore for JsonFileGateway {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let state = self.state.read().await;
        Ok(state.records(collection)?.values().cloned().collect())
    }

    async fn get(&self, collection: Collection, key: u64) -> StoreResult<Value> {
        let state = self.state.read().await;
        state
            .records(collection)?
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no record {key} in {collection}")))
    }

    async fn put(&self, collection: Collection, record: Value) -> StoreResult<Value> {
        let key = record_key(&record).ok_or_else(|| {
            StoreError::Serialization(format!("record for {collection} carries no id to upsert by"))
        })?;

        let mut state = self.state.write().await;
        let mut scratch = state.clone();
        scratch.observe_key(collection, key);
        scratch.insert(collection, key, record.clone())?;
        self.commit(&scratch).await?;
        *state = scratch;

        tracing::debug!("put {collection}[{key}]");
        Ok(record)
    }

    async fn add(&self, collection: Collection, record: Value) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut scratch = state.clone();
        let key = Self::stage_add(&mut scratch, collection, record)?;
        self.commit(&scratch).await?;
        *state = scratch;

        tracing::debug!("added {collection}[{key}]");
        Ok(key)
    }

    async fn add_and_select(&self, collection: Collection, record: Value) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut scratch = state.clone();
        let key = Self::stage_add(&mut scratch, collection, record)?;
        scratch.insert(
            Collection::SelectionPointer,
            POINTER_KEY,
            json!({ "id": POINTER_KEY, "selectedBoardId": key }),
        )?;
        self.commit(&scratch).await?;
        *state = scratch;

        tracing::debug!("added {collection}[{key}] and selected it");
        Ok(key)
    }
}

fn encode(envelope: &Envelope) -> StoreResult<Vec<u8>> {
    serde_json::to_vec_pretty(envelope).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::SCHEMA_VERSION;
    use taskboard_domain::{columns_from_names, Board, SelectionPointer};
    use tempfile::tempdir;

    fn board_record(name: &str) -> Value {
        serde_json::to_value(Board::new(name, columns_from_names(vec!["To Do"]))).unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_store_with_both_collections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boards.json");

        let gateway = JsonFileGateway::open(&path, SCHEMA_VERSION).await.unwrap();
        assert!(path.exists());
        assert!(gateway.get_all(Collection::Boards).await.unwrap().is_empty());
        assert!(gateway
            .get_all(Collection::SelectionPointer)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_keys() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::open(dir.path().join("boards.json"), SCHEMA_VERSION)
            .await
            .unwrap();

        let first = gateway
            .add(Collection::Boards, board_record("One"))
            .await
            .unwrap();
        let second = gateway
            .add(Collection::Boards, board_record("Two"))
            .await
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let stored = gateway.get(Collection::Boards, 2).await.unwrap();
        assert_eq!(stored["id"], 2);
        assert_eq!(stored["boardName"], "Two");
    }

    #[tokio::test]
    async fn test_add_respects_explicit_key() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::open(dir.path().join("boards.json"), SCHEMA_VERSION)
            .await
            .unwrap();

        let mut record = board_record("Explicit");
        record["id"] = json!(5);
        assert_eq!(gateway.add(Collection::Boards, record).await.unwrap(), 5);

        // Sequence continues past the explicit key.
        assert_eq!(
            gateway
                .add(Collection::Boards, board_record("Next"))
                .await
                .unwrap(),
            6
        );
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::open(dir.path().join("boards.json"), SCHEMA_VERSION)
            .await
            .unwrap();

        let err = gateway.get(Collection::Boards, 42).await.unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    }

    #[tokio::test]
    async fn test_put_upserts_by_id() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::open(dir.path().join("boards.json"), SCHEMA_VERSION)
            .await
            .unwrap();

        let key = gateway
            .add(Collection::Boards, board_record("Before"))
            .await
            .unwrap();

        let mut updated = board_record("After");
        updated["id"] = json!(key);
        gateway.put(Collection::Boards, updated).await.unwrap();

        let stored = gateway.get(Collection::Boards, key).await.unwrap();
        assert_eq!(stored["boardName"], "After");
        assert_eq!(gateway.get_all(Collection::Boards).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_without_id_is_rejected() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::open(dir.path().join("boards.json"), SCHEMA_VERSION)
            .await
            .unwrap();

        let err = gateway
            .put(Collection::Boards, board_record("No id"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_add_and_select_writes_both_records() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::open(dir.path().join("boards.json"), SCHEMA_VERSION)
            .await
            .unwrap();

        let key = gateway
            .add_and_select(Collection::Boards, board_record("Selected"))
            .await
            .unwrap();

        let pointer: SelectionPointer = serde_json::from_value(
            gateway
                .get(Collection::SelectionPointer, 1)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(pointer.selected_board_id, key);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boards.json");

        let key = {
            let gateway = JsonFileGateway::open(&path, SCHEMA_VERSION).await.unwrap();
            gateway
                .add_and_select(Collection::Boards, board_record("Persistent"))
                .await
                .unwrap()
        };

        let gateway = JsonFileGateway::open(&path, SCHEMA_VERSION).await.unwrap();
        let stored = gateway.get(Collection::Boards, key).await.unwrap();
        assert_eq!(stored["boardName"], "Persistent");
        assert_eq!(gateway.find_keys_by_name("Persistent").await, vec![key]);
    }

    #[tokio::test]
    async fn test_open_upgrades_older_envelope_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boards.json");

        // A version-0 envelope with only the boards collection, as an
        // earlier schema would have written it.
        let old = json!({
            "version": 0,
            "sequences": { "boards": 1 },
            "collections": { "boards": { "1": { "id": 1, "boardName": "Old", "columns": [] } } }
        });
        tokio::fs::write(&path, old.to_string()).await.unwrap();

        let gateway = JsonFileGateway::open(&path, SCHEMA_VERSION).await.unwrap();
        assert_eq!(gateway.get_all(Collection::Boards).await.unwrap().len(), 1);
        assert!(gateway
            .get_all(Collection::SelectionPointer)
            .await
            .unwrap()
            .is_empty());

        let reread: Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(reread["version"], SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_open_refuses_newer_envelope() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boards.json");
        let newer = json!({ "version": SCHEMA_VERSION + 1 });
        tokio::fs::write(&path, newer.to_string()).await.unwrap();

        let err = JsonFileGateway::open(&path, SCHEMA_VERSION)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("boards.json");

        let gateway = JsonFileGateway::open(&path, SCHEMA_VERSION).await.unwrap();
        gateway
            .add(Collection::Boards, board_record("Kept"))
            .await
            .unwrap();

        // Pull the directory out from under the store so the next write
        // cannot create its temp file.
        tokio::fs::remove_dir_all(&data_dir).await.unwrap();

        let err = gateway
            .add(Collection::Boards, board_record("Lost"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        let boards = gateway.get_all(Collection::Boards).await.unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0]["boardName"], "Kept");
    }
}
