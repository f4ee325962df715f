use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type LaneId = Uuid;

/// Category tag for a task bar. Purely visual; mapped to a display color in `ui::theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskColor {
    Blue,
    Green,
    Red,
    Purple,
    Yellow,
    Indigo,
    Pink,
    Gray,
}

impl TaskColor {
    pub const ALL: [TaskColor; 8] = [
        TaskColor::Blue,
        TaskColor::Green,
        TaskColor::Red,
        TaskColor::Purple,
        TaskColor::Yellow,
        TaskColor::Indigo,
        TaskColor::Pink,
        TaskColor::Gray,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskColor::Blue => "Blue",
            TaskColor::Green => "Green",
            TaskColor::Red => "Red",
            TaskColor::Purple => "Purple",
            TaskColor::Yellow => "Yellow",
            TaskColor::Indigo => "Indigo",
            TaskColor::Pink => "Pink",
            TaskColor::Gray => "Gray",
        }
    }
}

/// A schedulable unit of work placed in a swim lane.
///
/// A task occupies the half-open day interval `[start_day, start_day + duration)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub start_day: u32,
    /// Length in whole days, never zero.
    pub duration: u32,
    pub color: TaskColor,
    pub lane_id: LaneId,
    /// Ids of tasks this one depends on. Kept free of duplicates.
    pub dependencies: Vec<TaskId>,
    /// Virtual lane (slot) within the swim lane. Slot 0 is the top row.
    #[serde(default)]
    pub slot: u32,
}

impl Task {
    /// Create a new task in slot 0 with no dependencies.
    pub fn new(title: impl Into<String>, lane_id: LaneId, start_day: u32, duration: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start_day,
            duration: duration.max(1),
            color: TaskColor::Blue,
            lane_id,
            dependencies: Vec::new(),
            slot: 0,
        }
    }

    pub fn with_slot(mut self, slot: u32) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_color(mut self, color: TaskColor) -> Self {
        self.color = color;
        self
    }

    /// Exclusive end day.
    pub fn end_day(&self) -> u32 {
        self.start_day.saturating_add(self.duration)
    }

    pub fn depends_on(&self, id: TaskId) -> bool {
        self.dependencies.contains(&id)
    }
}
