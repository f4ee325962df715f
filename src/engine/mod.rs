//! Lane-packing engine: overlap detection, virtual-lane assignment, compaction,
//! drag sessions and task edits. Nothing in here depends on egui.

pub mod compaction;
pub mod drag;
pub mod ops;
pub mod overlap;
pub mod selection;
pub mod virtual_lane;

pub use drag::{DragController, DragSession, PointerPos};
pub use selection::{ClickModifiers, Selection};
