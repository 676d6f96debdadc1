//! Todo Redis Data Layer
//!
//! Async Redis persistence for the task collection.

pub mod client;
pub mod queries;

pub use client::{init_pool, RedisError, RedisPool, RedisResult};
pub use queries::tasks;
