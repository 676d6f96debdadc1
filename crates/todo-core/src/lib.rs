//! Todo Core Library
//!
//! Task model, persistence gateway and live change notification.

pub mod error;
pub mod notifier;
pub mod stream;
pub mod task;
pub mod web_notifier;

pub use error::{TodoError, TodoResult};
pub use notifier::{ChangeNotifier, Subscription};
pub use stream::{StreamState, TaskStream};
pub use task::collection::{MemoryCollection, RedisCollection, TaskCollection};
pub use task::model::{Task, TaskList, TaskPatch};
pub use task::TaskGateway;
pub use web_notifier::WebNotifier;
