use chrono::{Local, NaiveDate};

use super::lane::Lane;
use super::milestone::Milestone;
use super::store::TaskStore;
use super::task::LaneId;

/// A timeline board: swim lanes, their tasks, and milestones.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    /// Calendar date of day 0. Only used for header labels.
    pub origin: NaiveDate,
    pub lanes: Vec<Lane>,
    pub store: TaskStore,
    pub milestones: Vec<Milestone>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: "Untitled Timeline".to_string(),
            origin: Local::now().date_naive(),
            lanes: Vec::new(),
            store: TaskStore::default(),
            milestones: Vec::new(),
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_lookup_by_id() {
        let mut project = Project::new("p");
        let lane = Lane::new("Design");
        let id: LaneId = lane.id;
        project.lanes.push(lane);
        assert_eq!(project.lane(id).map(|l| l.title.as_str()), Some("Design"));
        assert!(project.lane(uuid::Uuid::new_v4()).is_none());
    }
}
