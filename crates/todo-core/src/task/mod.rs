//! Task management.

pub mod collection;
pub mod model;

use std::sync::Arc;

use crate::error::{TodoError, TodoResult};
use collection::TaskCollection;
use model::{Task, TaskPatch};
use tracing::{debug, info};

/// Single entry point for reading and writing tasks.
///
/// Cheap to clone; every clone shares the same backing collection.
#[derive(Clone)]
pub struct TaskGateway {
    collection: Arc<dyn TaskCollection>,
}

impl TaskGateway {
    pub fn new(collection: Arc<dyn TaskCollection>) -> Self {
        Self { collection }
    }

    /// Create a new task. Both fields must contain non-whitespace text.
    pub async fn create(&self, title: &str, description: &str) -> TodoResult<String> {
        if title.trim().is_empty() {
            return Err(TodoError::validation("title is required"));
        }
        if description.trim().is_empty() {
            return Err(TodoError::validation("description is required"));
        }

        let id = self.collection.insert_one(title, description).await?;
        info!(task_id = %id, "Task created");
        Ok(id)
    }

    /// Merge `patch` into the task with `id` and return the applied fields.
    pub async fn update(&self, id: &str, patch: TaskPatch) -> TodoResult<TaskPatch> {
        if patch.is_empty() {
            return Err(TodoError::validation("no fields to update"));
        }
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TodoError::validation("title cannot be empty"));
        }

        if !self.collection.find_and_update_by_id(id, &patch).await? {
            return Err(TodoError::NotFound(id.to_string()));
        }
        info!(task_id = %id, ?patch, "Task updated");
        Ok(patch)
    }

    /// Permanently remove the task with `id`.
    pub async fn delete(&self, id: &str) -> TodoResult<()> {
        match self.collection.delete_by_id(id).await? {
            1 => {
                info!(task_id = %id, "Task deleted");
                Ok(())
            }
            0 => Err(TodoError::NotFound(id.to_string())),
            n => Err(TodoError::StoreUnavailable(format!(
                "expected one deleted task for {id}, store reported {n}"
            ))),
        }
    }

    /// Get a task by ID.
    pub async fn get(&self, id: &str) -> TodoResult<Task> {
        self.collection
            .find_by_id(id)
            .await?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    /// List every persisted task.
    pub async fn list(&self) -> TodoResult<Vec<Task>> {
        let tasks = self.collection.find_all().await?;
        debug!(count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }
}
