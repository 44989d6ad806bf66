use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use taskboard_core::{StoreError, StoreResult};

use crate::traits::Collection;

/// Schema version the gateway opens stores at. Older envelopes are upgraded
/// in place on open.
pub const SCHEMA_VERSION: u32 = 1;

/// The persisted shape of the whole store: a versioned envelope holding
/// both collections, their auto-increment sequences, and the non-unique
/// secondary index on `boardName`.
///
/// Records are JSON objects keyed by their `id` field. A transaction is a
/// mutation of a scratch copy followed by one atomic file write, so a
/// multi-collection write commits entirely or not at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Envelope {
    pub version: u32,
    #[serde(default)]
    pub sequences: BTreeMap<String, u64>,
    #[serde(default)]
    pub collections: BTreeMap<String, BTreeMap<u64, Value>>,
    /// boardName -> keys of boards carrying that name, in key order.
    #[serde(default, rename = "boardNameIndex")]
    pub board_name_index: BTreeMap<String, Vec<u64>>,
}

impl Envelope {
    pub fn empty(version: u32) -> Self {
        let mut envelope = Self {
            version,
            sequences: BTreeMap::new(),
            collections: BTreeMap::new(),
            board_name_index: BTreeMap::new(),
        };
        envelope.ensure_schema(version);
        envelope
    }

    /// Create any missing collection or sequence and bump the version.
    /// Idempotent; the upgrade path of `open` funnels through here.
    pub fn ensure_schema(&mut self, version: u32) -> bool {
        let mut changed = self.version != version;
        self.version = version;
        for collection in Collection::ALL {
            let name = collection.name().to_string();
            if !self.collections.contains_key(&name) {
                self.collections.insert(name.clone(), BTreeMap::new());
                changed = true;
            }
            self.sequences.entry(name).or_insert(0);
        }
        changed
    }

    pub fn records(&self, collection: Collection) -> StoreResult<&BTreeMap<u64, Value>> {
        self.collections.get(collection.name()).ok_or_else(|| {
            StoreError::StoreUnavailable(format!("collection {collection} missing from store"))
        })
    }

    /// Next auto-assigned key for a collection.
    pub fn next_key(&mut self, collection: Collection) -> u64 {
        let sequence = self
            .sequences
            .entry(collection.name().to_string())
            .or_insert(0);
        *sequence += 1;
        *sequence
    }

    /// Keep the sequence ahead of explicitly supplied keys so later
    /// auto-assigned keys never collide.
    pub fn observe_key(&mut self, collection: Collection, key: u64) {
        let sequence = self
            .sequences
            .entry(collection.name().to_string())
            .or_insert(0);
        if key > *sequence {
            *sequence = key;
        }
    }

    /// Insert or replace the record under `key`, keeping the name index
    /// current for the boards collection.
    pub fn insert(&mut self, collection: Collection, key: u64, record: Value) -> StoreResult<()> {
        if collection == Collection::Boards {
            let previous = self
                .records(collection)?
                .get(&key)
                .and_then(board_name)
                .map(str::to_string);
            if let Some(name) = previous {
                self.index_remove(&name, key);
            }
            if let Some(name) = board_name(&record).map(str::to_string) {
                self.index_insert(name, key);
            }
        }

        self.collections
            .get_mut(collection.name())
            .ok_or_else(|| {
                StoreError::StoreUnavailable(format!("collection {collection} missing from store"))
            })?
            .insert(key, record);
        Ok(())
    }

    pub fn keys_by_name(&self, name: &str) -> Vec<u64> {
        self.board_name_index
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn index_insert(&mut self, name: String, key: u64) {
        let keys = self.board_name_index.entry(name).or_default();
        if let Err(position) = keys.binary_search(&key) {
            keys.insert(position, key);
        }
    }

    fn index_remove(&mut self, name: &str, key: u64) {
        if let Some(keys) = self.board_name_index.get_mut(name) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.board_name_index.remove(name);
            }
        }
    }
}

/// The key a record carries, if any. Missing, null, and zero ids all mean
/// "assign one for me" (zero is what a default-constructed record
/// serializes before the store has assigned its id).
pub(crate) fn record_key(record: &Value) -> Option<u64> {
    record.get("id").and_then(Value::as_u64).filter(|k| *k != 0)
}

fn board_name(record: &Value) -> Option<&str> {
    record.get("boardName").and_then(Value::as_str)
}
