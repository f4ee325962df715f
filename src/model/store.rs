use super::task::{LaneId, Task, TaskId};

/// Authoritative task collection.
///
/// Updates are whole-collection replacements: callers compute a new `Vec<Task>`
/// from a snapshot and hand it back through [`TaskStore::replace`], so readers
/// never observe a half-applied batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn lane_tasks(&self, lane_id: LaneId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.lane_id == lane_id)
    }

    /// Number of slot rows the lane needs to display (at least one).
    pub fn slot_count(&self, lane_id: LaneId) -> u32 {
        self.lane_tasks(lane_id)
            .map(|t| t.slot + 1)
            .max()
            .unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
