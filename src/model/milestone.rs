use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A labeled point on the timeline. Rendered as a diamond across all lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub day: u32,
}

impl Milestone {
    pub fn new(title: impl Into<String>, day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            day,
        }
    }
}
