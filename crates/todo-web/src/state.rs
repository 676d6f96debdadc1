//! Application state.

use todo_core::{ChangeNotifier, TaskGateway};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskGateway,
    pub notifier: ChangeNotifier,
}

impl AppState {
    pub fn new(tasks: TaskGateway) -> Self {
        let notifier = ChangeNotifier::new(tasks.clone());
        Self { tasks, notifier }
    }
}
