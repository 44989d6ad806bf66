use serde::{Deserialize, Serialize};

use crate::task::Task;

pub type ColumnId = u32;

/// Named ordered list of tasks within a board.
///
/// Column ids are unique per board, not globally; they are assigned at
/// creation time as the column's 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    #[serde(rename = "columnName")]
    pub column_name: String,
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn new(id: ColumnId, column_name: impl Into<String>) -> Self {
        Self {
            id,
            column_name: column_name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn task_index(&self, unique_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.unique_id == unique_id)
    }

    pub fn task_mut(&mut self, unique_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.unique_id == unique_id)
    }

    pub fn push_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Replace the task with the given unique id wholesale. The stored id
    /// wins over whatever id the replacement carries.
    pub fn replace_task(&mut self, unique_id: &str, mut updated: Task) -> Option<()> {
        let index = self.task_index(unique_id)?;
        updated.unique_id = unique_id.to_string();
        self.tasks[index] = updated;
        Some(())
    }

    pub fn remove_task(&mut self, unique_id: &str) -> Option<Task> {
        let index = self.task_index(unique_id)?;
        Some(self.tasks.remove(index))
    }

    /// Remove-then-insert reposition within this column. Returns `None`
    /// when either index is out of bounds.
    pub fn move_task(&mut self, from: usize, to: usize) -> Option<()> {
        if from >= self.tasks.len() || to >= self.tasks.len() {
            return None;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        Some(())
    }
}

/// Build columns from names in input order, assigning 1-based ids.
pub fn columns_from_names<S: Into<String>>(names: Vec<S>) -> Vec<Column> {
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| Column::new(index as u32 + 1, name))
        .collect()
}
