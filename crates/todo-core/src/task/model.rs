//! Task domain models.

use serde::{Deserialize, Serialize};
use todo_redis::tasks::{TaskRow, TaskRowPatch};

/// A to-do item. The id keeps the `_id` wire name clients already depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl Task {
    /// Create a Task from a database row.
    pub fn from_row(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
        }
    }
}

/// Partial update of the mutable task fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only sets the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Overwrite the provided fields of `task`.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }

    pub fn to_row_patch(&self) -> TaskRowPatch {
        TaskRowPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
        }
    }
}

/// Full task list as returned by `GET /tasks` and pushed on the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_wire_shape() {
        let task = Task {
            id: "A".to_string(),
            title: "Buy milk".to_string(),
            description: "2%".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"_id": "A", "title": "Buy milk", "description": "2%", "completed": false})
        );
    }

    #[test]
    fn test_patch_apply_leaves_omitted_fields() {
        let mut task = Task {
            id: "A".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            completed: false,
        };
        TaskPatch::completed(true).apply(&mut task);
        assert!(task.completed);
        assert_eq!(task.title, "t");
        assert_eq!(task.description, "d");
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch: TaskPatch = serde_json::from_str(r#"{"title":"new"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("new"));
        assert!(patch.completed.is_none());
        assert!(!patch.is_empty());
        assert!(TaskPatch::default().is_empty());
    }
}
