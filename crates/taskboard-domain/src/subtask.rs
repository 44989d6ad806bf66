use serde::{Deserialize, Serialize};

/// Boolean-completion checklist item within a task.
///
/// Subtask ids are positional (1-based, unique within their task) and are
/// reassigned whenever a task's subtasks are replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u32,
    #[serde(rename = "subTaskTitle")]
    pub sub_task_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
}

impl Subtask {
    pub fn new(id: u32, sub_task_title: String, description: Option<String>) -> Self {
        Self {
            id,
            sub_task_title,
            description,
            completed: false,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Build subtasks from titles in input order, assigning 1-based ids.
pub fn subtasks_from_titles<S: Into<String>>(titles: Vec<S>) -> Vec<Subtask> {
    titles
        .into_iter()
        .enumerate()
        .map(|(index, title)| Subtask::new(index as u32 + 1, title.into(), None))
        .collect()
}
