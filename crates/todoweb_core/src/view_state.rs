use crate::model::Task;

/// Local snapshot of the task list.
///
/// Holds either the result of the most recent successful fetch or nothing.
/// Single records are never inserted, patched or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    tasks: Vec<Task>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn current(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
