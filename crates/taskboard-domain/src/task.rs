use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subtask::Subtask;

/// Unit of work with a title, optional description, and ordered subtasks.
///
/// `unique_id` is globally unique (unlike column and subtask ids, which are
/// positional within their parent) and stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(title: String, description: Option<String>, subtasks: Vec<Subtask>) -> Self {
        Self {
            unique_id: Uuid::new_v4().to_string(),
            title,
            description,
            subtasks,
        }
    }

    pub fn subtask_mut(&mut self, index: usize) -> Option<&mut Subtask> {
        self.subtasks.get_mut(index)
    }
}

/// The user-supplied fields of a task, before a unique id is assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self
    }

    /// Mint a task from the draft with a fresh unique id.
    pub fn into_task(self) -> Task {
        Task::new(self.title, self.description, self.subtasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtask::subtasks_from_titles;

    #[test]
    fn test_new_task_gets_fresh_unique_id() {
        let a = Task::new("A".to_string(), None, vec![]);
        let b = Task::new("A".to_string(), None, vec![]);
        assert_ne!(a.unique_id, b.unique_id);
        assert!(Uuid::parse_str(&a.unique_id).is_ok());
    }

    #[test]
    fn test_draft_into_task_keeps_fields() {
        let task = TaskDraft::new("Ship it")
            .with_description("release checklist")
            .with_subtasks(subtasks_from_titles(vec!["tag", "publish"]))
            .into_task();

        assert_eq!(task.title, "Ship it");
        assert_eq!(task.description.as_deref(), Some("release checklist"));
        assert_eq!(task.subtasks.len(), 2);
    }

    #[test]
    fn test_serde_field_names() {
        let task = Task::new("A".to_string(), None, vec![]);
        let value = serde_json::to_value(&task).unwrap();
        assert!(value["uniqueId"].is_string());
        assert!(value["subtasks"].is_array());
    }
}
