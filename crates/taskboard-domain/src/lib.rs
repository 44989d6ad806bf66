pub mod board;
pub mod column;
pub mod selection;
pub mod subtask;
pub mod task;

pub use board::{Board, BoardId};
pub use column::{columns_from_names, Column, ColumnId};
pub use selection::{CatalogEntry, SelectionPointer, POINTER_KEY};
pub use subtask::{subtasks_from_titles, Subtask};
pub use task::{Task, TaskDraft};
