use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use taskboard_core::{AppConfig, StoreError, StoreResult};
use taskboard_domain::{
    columns_from_names, Board, BoardId, CatalogEntry, Column, ColumnId, SelectionPointer, Task,
    TaskDraft, POINTER_KEY,
};
use taskboard_persistence::{Collection, JsonFileGateway, RecordStore, SCHEMA_VERSION};

use crate::channels::StateChannels;

pub const DEFAULT_BOARD_NAME: &str = "Welcome Board";
pub const DEFAULT_COLUMN_NAMES: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Single long-lived owner of the store connection and the published
/// selection state. Every mutation is one read of the full board record, an
/// in-memory structural edit, and one whole-record write-back, after which
/// the selected board is republished to all observers.
///
/// There is no optimistic-concurrency token: two overlapping
/// read-modify-write cycles on the same board can lose the first write.
/// Accepted limitation of the single-tab model.
pub struct BoardsService {
    store: Arc<dyn RecordStore>,
    state: StateChannels,
}

impl BoardsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            state: StateChannels::new(),
        }
    }

    /// Open the store at the configured location (`AppConfig`).
    pub async fn open_default() -> StoreResult<Self> {
        Self::open_at(AppConfig::load().store_path()).await
    }

    pub async fn open_at(path: impl AsRef<Path>) -> StoreResult<Self> {
        let gateway = JsonFileGateway::open(path, SCHEMA_VERSION).await?;
        Ok(Self::new(Arc::new(gateway)))
    }

    pub fn state(&self) -> &StateChannels {
        &self.state
    }

    /// First-run / session initialization. Loads the catalog, creates the
    /// default board when the store is empty (board and selection pointer
    /// committed in one transaction), resolves the selection pointer, and
    /// publishes all three state channels. Idempotent: running it again
    /// neither creates a second default board nor moves the selection.
    ///
    /// Any failing step aborts initialization; the application must not
    /// render board contents in that case.
    pub async fn init(&self) -> StoreResult<Board> {
        let mut catalog = self.load_catalog().await?;

        if catalog.is_empty() {
            let board = Board::new(
                DEFAULT_BOARD_NAME,
                columns_from_names(DEFAULT_COLUMN_NAMES.to_vec()),
            );
            self.store
                .add_and_select(Collection::Boards, to_record(&board)?)
                .await?;
            tracing::info!("first run: created default board \"{DEFAULT_BOARD_NAME}\"");
            catalog = self.load_catalog().await?;
        }

        // The pointer is written whenever a board is created, so absence
        // here is a consistency error, not a first run.
        let pointer = self.load_pointer().await?;
        let board = self.load_board(pointer.selected_board_id).await?;

        self.state
            .publish_selected_board_id(Some(pointer.selected_board_id));
        self.state.publish_catalog(catalog);
        self.state.publish_selected_board(Some(board.clone()));

        tracing::debug!(
            board_id = pointer.selected_board_id,
            "boards service initialized"
        );
        Ok(board)
    }

    // ------------------------------------------------------------------
    // Board operations
    // ------------------------------------------------------------------

    /// Insert a new board, select it (same transaction), publish it, and
    /// refresh the catalog.
    pub async fn create_board(&self, name: String, columns: Vec<Column>) -> StoreResult<Board> {
        self.selected_id()?;

        let board = Board::new(name, columns);
        let key = self
            .store
            .add_and_select(Collection::Boards, to_record(&board)?)
            .await?;
        let board = self.load_board(key).await?;

        self.state.publish_selected_board_id(Some(key));
        self.state.publish_selected_board(Some(board.clone()));
        self.refresh_catalog().await?;
        Ok(board)
    }

    /// Replace the selected board's name and columns wholesale, keeping its
    /// id. The catalog is refreshed only when the name changed.
    pub async fn edit_board(&self, name: String, columns: Vec<Column>) -> StoreResult<Board> {
        let mut renamed = false;
        let board = self
            .update_selected(|board| {
                renamed = board.board_name != name;
                board.board_name = name;
                board.columns = columns;
                Ok(())
            })
            .await?;

        if renamed {
            self.refresh_catalog().await?;
        }
        Ok(board)
    }

    /// Rebuild the catalog by scanning all boards and publish it.
    pub async fn refresh_catalog(&self) -> StoreResult<Vec<CatalogEntry>> {
        let catalog = self.load_catalog().await?;
        self.state.publish_catalog(catalog.clone());
        Ok(catalog)
    }

    // ------------------------------------------------------------------
    // Task operations
    // ------------------------------------------------------------------

    /// Mint a task from the draft (fresh unique id) and append it to the
    /// named column of the selected board.
    pub async fn create_task(&self, column_id: ColumnId, draft: TaskDraft) -> StoreResult<Task> {
        let task = draft.into_task();
        let created = task.clone();

        self.update_selected(|board| {
            board
                .column_mut(column_id)
                .ok_or_else(|| column_not_found(column_id))?
                .push_task(task);
            Ok(())
        })
        .await?;
        Ok(created)
    }

    /// Replace the task located by unique id within the named column. The
    /// unique id is preserved across the replacement.
    pub async fn edit_task(
        &self,
        column_id: ColumnId,
        task_uid: &str,
        updated: Task,
    ) -> StoreResult<()> {
        self.update_selected(|board| {
            board
                .column_mut(column_id)
                .ok_or_else(|| column_not_found(column_id))?
                .replace_task(task_uid, updated)
                .ok_or_else(|| task_not_found(task_uid))
        })
        .await?;
        Ok(())
    }

    /// Remove the task located by unique id from the named column.
    pub async fn delete_task(&self, column_id: ColumnId, task_uid: &str) -> StoreResult<()> {
        self.update_selected(|board| {
            board
                .column_mut(column_id)
                .ok_or_else(|| column_not_found(column_id))?
                .remove_task(task_uid)
                .map(|_| ())
                .ok_or_else(|| task_not_found(task_uid))
        })
        .await?;
        Ok(())
    }

    /// Flip the completion flag of one subtask, locating the task by
    /// scanning all columns. Fire-and-forget: failures are logged, never
    /// surfaced to the caller.
    pub async fn toggle_subtask_completion(&self, task_uid: &str, subtask_index: usize) {
        let result = self
            .update_selected(|board| {
                board
                    .toggle_subtask(task_uid, subtask_index)
                    .ok_or_else(|| {
                        StoreError::NotFound(format!(
                            "task {task_uid} has no subtask at index {subtask_index}"
                        ))
                    })
            })
            .await;

        if let Err(error) = result {
            tracing::error!(%error, task_uid, "failed to toggle subtask completion");
        }
    }

    /// Move the task (found by scan) to the end of the target column.
    /// Fire-and-forget, like `toggle_subtask_completion`.
    pub async fn change_task_column(&self, task_uid: &str, new_column_id: ColumnId) {
        let result = self
            .update_selected(|board| {
                board
                    .relocate_task(task_uid, new_column_id)
                    .ok_or_else(|| {
                        StoreError::NotFound(format!(
                            "task {task_uid} or column {new_column_id} missing"
                        ))
                    })
            })
            .await;

        if let Err(error) = result {
            tracing::error!(%error, task_uid, "failed to change task column");
        }
    }

    // ------------------------------------------------------------------
    // Internals (also used by the reorder coordinator)
    // ------------------------------------------------------------------

    pub(crate) fn selected_id(&self) -> StoreResult<BoardId> {
        self.state.current_selected_board_id().ok_or_else(|| {
            StoreError::NotReady("boards service not initialized: no selected board".to_string())
        })
    }

    /// The read-modify-write cycle every mutation funnels through: load the
    /// selected board, apply the edit in memory, write the whole record
    /// back, republish.
    pub(crate) async fn update_selected<F>(&self, edit: F) -> StoreResult<Board>
    where
        F: FnOnce(&mut Board) -> StoreResult<()>,
    {
        let id = self.selected_id()?;
        let mut board = self.load_board(id).await?;
        edit(&mut board)?;

        self.store
            .put(Collection::Boards, to_record(&board)?)
            .await?;
        self.state.publish_selected_board(Some(board.clone()));
        Ok(board)
    }

    pub(crate) async fn load_board(&self, id: BoardId) -> StoreResult<Board> {
        from_record(self.store.get(Collection::Boards, id).await?)
    }

    async fn load_pointer(&self) -> StoreResult<SelectionPointer> {
        from_record(
            self.store
                .get(Collection::SelectionPointer, POINTER_KEY)
                .await?,
        )
    }

    async fn load_catalog(&self) -> StoreResult<Vec<CatalogEntry>> {
        self.store
            .get_all(Collection::Boards)
            .await?
            .into_iter()
            .map(|record| {
                let board: Board = from_record(record)?;
                Ok(CatalogEntry {
                    board_name: board.board_name,
                    uid: board.id,
                })
            })
            .collect()
    }
}

fn to_record<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_record<T: DeserializeOwned>(record: Value) -> StoreResult<T> {
    serde_json::from_value(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn column_not_found(column_id: ColumnId) -> StoreError {
    StoreError::NotFound(format!("no column {column_id} in the selected board"))
}

fn task_not_found(task_uid: &str) -> StoreError {
    StoreError::NotFound(format!("no task {task_uid} in the named column"))
}
