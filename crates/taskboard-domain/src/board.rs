use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnId};
use crate::task::Task;

pub type BoardId = u64;

/// Top-level kanban entity containing ordered columns.
///
/// The id is store-assigned on insert and stable afterwards; records built
/// for insertion omit it (see the persistence gateway's `add`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub id: BoardId,
    #[serde(rename = "boardName")]
    pub board_name: String,
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(board_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: 0,
            board_name: board_name.into(),
            columns,
        }
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// First column whose task list contains the given task, scanning in
    /// column order.
    pub fn column_of_task_mut(&mut self, task_uid: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.task_index(task_uid).is_some())
    }

    pub fn find_task(&self, task_uid: &str) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.unique_id == task_uid)
    }

    /// Flip the completion flag of the subtask at `subtask_index` on the
    /// task found by scanning all columns.
    pub fn toggle_subtask(&mut self, task_uid: &str, subtask_index: usize) -> Option<()> {
        let column = self.column_of_task_mut(task_uid)?;
        let task = column.task_mut(task_uid)?;
        task.subtask_mut(subtask_index)?.toggle();
        Some(())
    }

    /// Remove the task from whichever column currently holds it and append
    /// it to the end of the target column.
    pub fn relocate_task(&mut self, task_uid: &str, new_column_id: ColumnId) -> Option<()> {
        // Take the task out first so a same-column relocate still lands at
        // the end of the list.
        let task = self.column_of_task_mut(task_uid)?.remove_task(task_uid)?;
        match self.column_mut(new_column_id) {
            Some(target) => {
                target.push_task(task);
                Some(())
            }
            None => None,
        }
    }

    /// Remove-then-insert move across two columns of this board. Returns
    /// `None` when a column is missing or an index is out of bounds; the
    /// board is left unchanged in that case.
    pub fn move_task_between_columns(
        &mut self,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        from_index: usize,
        to_index: usize,
    ) -> Option<()> {
        if from_column_id == to_column_id {
            return self.column_mut(from_column_id)?.move_task(from_index, to_index);
        }

        // Validate the target before splicing the source.
        let to_len = self.column(to_column_id)?.tasks.len();
        if to_index > to_len {
            return None;
        }

        let source = self.column_mut(from_column_id)?;
        if from_index >= source.tasks.len() {
            return None;
        }
        let task = source.tasks.remove(from_index);
        self.column_mut(to_column_id)
            .expect("target column checked above")
            .tasks
            .insert(to_index, task);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::columns_from_names;

    fn board_with_tasks() -> Board {
        let mut board = Board::new("Test", columns_from_names(vec!["X", "Y"]));
        for title in ["A", "B"] {
            board
                .column_mut(1)
                .unwrap()
                .push_task(Task::new(title.to_string(), None, vec![]));
        }
        board
            .column_mut(2)
            .unwrap()
            .push_task(Task::new("C".to_string(), None, vec![]));
        board
    }

    fn titles(board: &Board, column_id: ColumnId) -> Vec<&str> {
        board
            .column(column_id)
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect()
    }

    #[test]
    fn test_move_task_between_columns() {
        let mut board = board_with_tasks();
        // X = [A, B], Y = [C]: move X[0] to Y[1].
        board.move_task_between_columns(1, 2, 0, 1).unwrap();
        assert_eq!(titles(&board, 1), vec!["B"]);
        assert_eq!(titles(&board, 2), vec!["C", "A"]);
    }

    #[test]
    fn test_move_between_columns_bad_target_leaves_board_unchanged() {
        let mut board = board_with_tasks();
        assert!(board.move_task_between_columns(1, 2, 0, 5).is_none());
        assert!(board.move_task_between_columns(1, 9, 0, 0).is_none());
        assert_eq!(titles(&board, 1), vec!["A", "B"]);
        assert_eq!(titles(&board, 2), vec!["C"]);
    }

    #[test]
    fn test_relocate_task_appends_to_target() {
        let mut board = board_with_tasks();
        let uid = board.column(1).unwrap().tasks[0].unique_id.clone();

        board.relocate_task(&uid, 2).unwrap();
        assert_eq!(titles(&board, 1), vec!["B"]);
        assert_eq!(titles(&board, 2), vec!["C", "A"]);
    }

    #[test]
    fn test_toggle_subtask_scans_columns() {
        let mut board = board_with_tasks();
        let task = Task::new(
            "With subtasks".to_string(),
            None,
            crate::subtask::subtasks_from_titles(vec!["s1", "s2"]),
        );
        let uid = task.unique_id.clone();
        board.column_mut(2).unwrap().push_task(task);

        board.toggle_subtask(&uid, 1).unwrap();
        let task = board.find_task(&uid).unwrap();
        assert!(!task.subtasks[0].completed);
        assert!(task.subtasks[1].completed);

        assert!(board.toggle_subtask(&uid, 9).is_none());
        assert!(board.toggle_subtask("missing", 0).is_none());
    }

    #[test]
    fn test_serde_round_trip_uses_original_field_names() {
        let board = board_with_tasks();
        let value = serde_json::to_value(&board).unwrap();
        assert_eq!(value["boardName"], "Test");
        assert_eq!(value["columns"][0]["columnName"], "X");
        assert!(value["columns"][0]["tasks"][0]["uniqueId"].is_string());

        let back: Board = serde_json::from_value(value).unwrap();
        assert_eq!(back, board);
    }
}
