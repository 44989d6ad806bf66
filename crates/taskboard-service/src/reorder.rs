//! Optimistic reorder coordinator: drag-and-drop moves are applied to the
//! published in-memory board before the write is issued, and rolled back to
//! a snapshot if the write fails. One persisted write attempt per gesture.

use taskboard_core::{StoreError, StoreResult};
use taskboard_domain::{Board, ColumnId};

use crate::service::BoardsService;

impl BoardsService {
    /// Reposition a task within one column (remove-then-insert splice).
    /// The in-memory board updates immediately; on a failed write it is
    /// restored to the exact pre-move state and the error is returned so
    /// the caller can react.
    pub async fn move_task_in_column(
        &self,
        column_id: ColumnId,
        from_index: usize,
        to_index: usize,
    ) -> StoreResult<()> {
        let apply = move |board: &mut Board| {
            board
                .column_mut(column_id)
                .and_then(|column| column.move_task(from_index, to_index))
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "cannot move task {from_index} -> {to_index} in column {column_id}"
                    ))
                })
        };
        self.optimistic_move(apply, apply).await
    }

    /// Move a task from one column to a position in another, with the same
    /// optimistic-update / rollback protocol.
    pub async fn move_task_between_columns(
        &self,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        from_index: usize,
        to_index: usize,
    ) -> StoreResult<()> {
        let apply = move |board: &mut Board| {
            board
                .move_task_between_columns(from_column_id, to_column_id, from_index, to_index)
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "cannot move task {from_column_id}[{from_index}] -> {to_column_id}[{to_index}]"
                    ))
                })
        };
        self.optimistic_move(apply, apply).await
    }

    /// Snapshot the published board, apply the move in memory and publish,
    /// then persist via the usual read-modify-write; restore the snapshot
    /// on failure.
    ///
    /// The edit is applied independently to the published value and to the
    /// freshly read record, so the persisted write never depends on what a
    /// subscriber may have done to its copy.
    async fn optimistic_move<A, P>(&self, apply_in_memory: A, apply_persisted: P) -> StoreResult<()>
    where
        A: FnOnce(&mut Board) -> StoreResult<()>,
        P: FnOnce(&mut Board) -> StoreResult<()>,
    {
        let id = self.selected_id()?;
        let snapshot = self
            .state()
            .current_selected_board()
            .filter(|board| board.id == id)
            .ok_or_else(|| {
                StoreError::NotReady("no selected board published yet".to_string())
            })?;

        let mut optimistic = snapshot.clone();
        apply_in_memory(&mut optimistic)?;
        self.state().publish_selected_board(Some(optimistic));

        match self.update_selected(apply_persisted).await {
            Ok(_) => Ok(()),
            Err(error) => {
                tracing::error!(%error, "reorder write failed, restoring previous state");
                self.state().publish_selected_board(Some(snapshot));
                Err(error)
            }
        }
    }
}
