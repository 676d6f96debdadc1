//! Document collection port and its adapters.

use async_trait::async_trait;
use todo_redis::{tasks as queries, RedisPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Task, TaskPatch};
use crate::error::TodoResult;

/// The operations the gateway needs from a backing document store.
#[async_trait]
pub trait TaskCollection: Send + Sync {
    /// Insert a new, not yet completed task and return the generated id.
    async fn insert_one(&self, title: &str, description: &str) -> TodoResult<String>;

    /// Every stored task in stable iteration order.
    async fn find_all(&self) -> TodoResult<Vec<Task>>;

    async fn find_by_id(&self, id: &str) -> TodoResult<Option<Task>>;

    /// Merge `patch` into the task with `id`. Returns whether a task matched.
    async fn find_and_update_by_id(&self, id: &str, patch: &TaskPatch) -> TodoResult<bool>;

    /// Remove the task with `id`. Returns the number of tasks deleted (0 or 1).
    async fn delete_by_id(&self, id: &str) -> TodoResult<u64>;
}

/// Redis-backed collection.
#[derive(Clone)]
pub struct RedisCollection {
    pool: RedisPool,
}

impl RedisCollection {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Connect to Redis at `redis_url`.
    pub async fn connect(redis_url: &str) -> TodoResult<Self> {
        let pool = todo_redis::init_pool(redis_url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TaskCollection for RedisCollection {
    async fn insert_one(&self, title: &str, description: &str) -> TodoResult<String> {
        Ok(queries::insert_task(&self.pool, title, description).await?)
    }

    async fn find_all(&self) -> TodoResult<Vec<Task>> {
        let rows = queries::list_tasks(&self.pool).await?;
        Ok(rows.into_iter().map(Task::from_row).collect())
    }

    async fn find_by_id(&self, id: &str) -> TodoResult<Option<Task>> {
        let row = queries::get_task(&self.pool, id).await?;
        Ok(row.map(Task::from_row))
    }

    async fn find_and_update_by_id(&self, id: &str, patch: &TaskPatch) -> TodoResult<bool> {
        Ok(queries::update_task(&self.pool, id, &patch.to_row_patch()).await?)
    }

    async fn delete_by_id(&self, id: &str) -> TodoResult<u64> {
        Ok(queries::delete_task(&self.pool, id).await?)
    }
}

/// In-process collection. Used by tests and by `serve --store memory`.
#[derive(Default)]
pub struct MemoryCollection {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskCollection for MemoryCollection {
    async fn insert_one(&self, title: &str, description: &str) -> TodoResult<String> {
        let id = Uuid::new_v4().to_string();
        self.tasks.write().await.push(Task {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
        });
        Ok(id)
    }

    async fn find_all(&self) -> TodoResult<Vec<Task>> {
        Ok(self.tasks.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> TodoResult<Option<Task>> {
        Ok(self.tasks.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn find_and_update_by_id(&self, id: &str, patch: &TaskPatch) -> TodoResult<bool> {
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                patch.apply(task);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &str) -> TodoResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok((before - tasks.len()) as u64)
    }
}
