pub mod lane;
pub mod milestone;
pub mod project;
pub mod store;
pub mod task;
pub mod timeline;

pub use lane::Lane;
pub use milestone::Milestone;
pub use project::Project;
pub use store::TaskStore;
pub use task::{LaneId, Task, TaskColor, TaskId};
pub use timeline::{Geometry, TimelineViewport};
