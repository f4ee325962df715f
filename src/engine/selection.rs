use crate::model::{Task, TaskId};

/// Modifier keys held during a task click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub command: bool,
    pub shift: bool,
}

/// Ordered multi-selection of task ids, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<TaskId>,
}

impl Selection {
    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn select_only(&mut self, id: TaskId) {
        self.ids = vec![id];
    }

    pub fn select_all(&mut self, tasks: &[Task]) {
        self.ids = tasks.iter().map(|t| t.id).collect();
    }

    /// Drop ids that no longer exist in `tasks`.
    pub fn retain_existing(&mut self, tasks: &[Task]) {
        self.ids.retain(|id| tasks.iter().any(|t| t.id == *id));
    }

    fn push(&mut self, id: TaskId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Apply a click on `id`.
    ///
    /// Shift extends the selection with every task between the most recently
    /// selected one and `id`, taken in collection order within the clicked
    /// task's lane; nothing happens when the anchor is in another lane or the
    /// selection is empty. Command toggles `id`. A plain click selects only `id`.
    pub fn click(&mut self, id: TaskId, modifiers: ClickModifiers, tasks: &[Task]) {
        if modifiers.shift {
            self.extend_range(id, tasks);
        } else if modifiers.command {
            if self.contains(id) {
                self.ids.retain(|s| *s != id);
            } else {
                self.ids.push(id);
            }
        } else {
            self.select_only(id);
        }
    }

    fn extend_range(&mut self, id: TaskId, tasks: &[Task]) {
        let Some(clicked) = tasks.iter().find(|t| t.id == id) else {
            return;
        };
        let Some(&anchor) = self.ids.last() else {
            return;
        };
        let lane: Vec<TaskId> = tasks
            .iter()
            .filter(|t| t.lane_id == clicked.lane_id)
            .map(|t| t.id)
            .collect();
        let (Some(from), Some(to)) = (
            lane.iter().position(|t| *t == anchor),
            lane.iter().position(|t| *t == id),
        ) else {
            return;
        };
        let (lo, hi) = (from.min(to), from.max(to));
        for &t in &lane[lo..=hi] {
            self.push(t);
        }
    }
}
