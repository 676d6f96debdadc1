//! Task document queries — Redis implementation.
//!
//! Documents live in a single hash keyed by task id. A sorted set scored by a
//! monotonically increasing counter keeps the iteration order stable.

use std::collections::HashMap;

use crate::client::{RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TASKS_KEY: &str = "todo:tasks";
const ORDER_KEY: &str = "todo:tasks:order";
const SEQ_KEY: &str = "todo:tasks:seq";

/// Assigns the next order score and stores the document with it in one step.
const INSERT_SCRIPT: &str = r#"
local seq = redis.call('INCR', KEYS[3])
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
redis.call('ZADD', KEYS[2], seq, ARGV[1])
return seq
"#;

/// Merges a JSON patch into the stored document. Returns 0 when the id is absent.
const MERGE_SCRIPT: &str = r#"
local raw = redis.call('HGET', KEYS[1], ARGV[1])
if not raw then
  return 0
end
local doc = cjson.decode(raw)
local patch = cjson.decode(ARGV[2])
for k, v in pairs(patch) do
  doc[k] = v
end
redis.call('HSET', KEYS[1], ARGV[1], cjson.encode(doc))
return 1
"#;

/// Stored form of a task. The id is the hash field, not part of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A task document together with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

/// Fields to merge into an existing document. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskRowPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Insert a new task document and return its generated id.
pub async fn insert_task(pool: &RedisPool, title: &str, description: &str) -> RedisResult<String> {
    let mut conn = pool.clone();
    let id = Uuid::new_v4().to_string();
    let doc = TaskDocument {
        title: title.to_string(),
        description: description.to_string(),
        completed: false,
    };
    let json = serde_json::to_string(&doc)?;

    let seq: i64 = redis::Script::new(INSERT_SCRIPT)
        .key(TASKS_KEY)
        .key(ORDER_KEY)
        .key(SEQ_KEY)
        .arg(&id)
        .arg(json)
        .invoke_async(&mut conn)
        .await?;

    tracing::debug!(task_id = %id, seq, "Inserted task document");
    Ok(id)
}

/// Read every task document in insertion order.
pub async fn list_tasks(pool: &RedisPool) -> RedisResult<Vec<TaskRow>> {
    let mut conn = pool.clone();
    let (order, docs): (Vec<String>, HashMap<String, String>) = redis::pipe()
        .atomic()
        .zrange(ORDER_KEY, 0, -1)
        .hgetall(TASKS_KEY)
        .query_async(&mut conn)
        .await?;
    decode_rows(order, docs)
}

/// Read a single task document.
pub async fn get_task(pool: &RedisPool, task_id: &str) -> RedisResult<Option<TaskRow>> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.hget(TASKS_KEY, task_id).await?;
    match json {
        Some(j) => Ok(Some(into_row(task_id.to_string(), serde_json::from_str(&j)?))),
        None => Ok(None),
    }
}

/// Merge `patch` into the document with `task_id`. Returns whether a document matched.
pub async fn update_task(pool: &RedisPool, task_id: &str, patch: &TaskRowPatch) -> RedisResult<bool> {
    let mut conn = pool.clone();
    let patch_json = serde_json::to_string(patch)?;
    let matched: i64 = redis::Script::new(MERGE_SCRIPT)
        .key(TASKS_KEY)
        .arg(task_id)
        .arg(patch_json)
        .invoke_async(&mut conn)
        .await?;
    Ok(matched == 1)
}

/// Delete the document with `task_id`. Returns the number of documents removed (0 or 1).
pub async fn delete_task(pool: &RedisPool, task_id: &str) -> RedisResult<u64> {
    let mut conn = pool.clone();
    let (removed, _): (u64, u64) = redis::pipe()
        .atomic()
        .hdel(TASKS_KEY, task_id)
        .zrem(ORDER_KEY, task_id)
        .query_async(&mut conn)
        .await?;
    Ok(removed)
}

fn into_row(id: String, doc: TaskDocument) -> TaskRow {
    TaskRow {
        id,
        title: doc.title,
        description: doc.description,
        completed: doc.completed,
    }
}

/// Pair the order index with the document hash. Ids without a document are skipped.
fn decode_rows(order: Vec<String>, mut docs: HashMap<String, String>) -> RedisResult<Vec<TaskRow>> {
    let mut rows = Vec::with_capacity(order.len());
    for id in order {
        if let Some(json) = docs.remove(&id) {
            let doc: TaskDocument = serde_json::from_str(&json)?;
            rows.push(into_row(id, doc));
        }
    }
    Ok(rows)
}
