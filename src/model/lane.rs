use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::LaneId;

/// A named, collapsible horizontal grouping of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub title: String,
    pub is_expanded: bool,
}

impl Lane {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_expanded: true,
        }
    }
}
