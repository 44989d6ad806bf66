use async_trait::async_trait;
use serde_json::Value;
use taskboard_core::StoreResult;

/// The two record collections the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Board records keyed by a store-assigned id, with a non-unique
    /// secondary index on `boardName`.
    Boards,
    /// The single selection pointer record, fixed key 1.
    SelectionPointer,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Boards, Collection::SelectionPointer];

    /// Persisted collection name.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Boards => "boards",
            Collection::SelectionPointer => "selected-board-pointer",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Asynchronous primitives over the two collections, hiding the store's
/// open/upgrade lifecycle. Records are JSON objects keyed by their `id`
/// field, mirroring the persisted layout.
///
/// Each call is one transaction: a failed write leaves the store unchanged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of a collection, in key order.
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Value>>;

    /// The record under `key`, or `NotFound`.
    async fn get(&self, collection: Collection, key: u64) -> StoreResult<Value>;

    /// Upsert by the record's `id` field; returns the committed record.
    async fn put(&self, collection: Collection, record: Value) -> StoreResult<Value>;

    /// Insert a record, assigning the next key when the record carries no
    /// id; returns the assigned key.
    async fn add(&self, collection: Collection, record: Value) -> StoreResult<u64>;

    /// Insert a record and point the selection pointer at its assigned key,
    /// as a single transaction: either both writes commit or neither does.
    async fn add_and_select(&self, collection: Collection, record: Value) -> StoreResult<u64>;
}
