//! Pointer-driven relocation of one or more tasks.
//!
//! A [`DragSession`] captures where every moved task started. Each pointer move
//! recomputes all moved tasks from those origins plus the cumulative pointer
//! delta, so dropped or repeated move events never accumulate drift and a
//! multi-selection always moves as a rigid group.
//!
//! Lifecycle: `Idle -> Active` on [`begin_drag`], live updates through
//! [`update_drag`], then [`end_drag`] (commit: final slot resolution plus lane
//! compaction) or [`cancel_drag`] (restore origins). Both consume the session.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::EngineError;
use crate::model::{Geometry, LaneId, Task, TaskId};

use super::compaction::compact_lanes;
use super::virtual_lane::{verify_no_overlap, Occupancy, Placement};

/// Pointer position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Origin {
    start_day: u32,
    slot: u32,
}

/// State of an in-progress drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    task_ids: Vec<TaskId>,
    origin_pointer: PointerPos,
    origins: HashMap<TaskId, Origin>,
    day_delta: i64,
    slot_delta: i64,
    /// Every slot first-fit escalated a task to during this drag.
    snapped: HashMap<TaskId, BTreeSet<u32>>,
    /// Tasks whose preferred slot was contested on the latest update.
    contested: HashSet<TaskId>,
}

impl DragSession {
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    pub fn is_dragging(&self, id: TaskId) -> bool {
        self.origins.contains_key(&id)
    }

    pub fn snapped_slots(&self, id: TaskId) -> Option<&BTreeSet<u32>> {
        self.snapped.get(&id)
    }

    /// True when the task could not stay in its requested slot on the latest update.
    pub fn is_contested(&self, id: TaskId) -> bool {
        self.contested.contains(&id)
    }

    fn lanes(&self, tasks: &[Task]) -> BTreeSet<LaneId> {
        tasks
            .iter()
            .filter(|t| self.is_dragging(t.id))
            .map(|t| t.lane_id)
            .collect()
    }
}

/// Open a session for a pointer-down on `task_id`.
///
/// Moves the whole `selection` when it contains `task_id`, otherwise just that
/// task. Ids missing from `tasks` get no origin and are skipped for the rest of
/// the session. Returns `None` when the clicked task itself is unknown.
pub fn begin_drag(
    task_id: TaskId,
    pointer: PointerPos,
    selection: &[TaskId],
    tasks: &[Task],
) -> Option<DragSession> {
    if !tasks.iter().any(|t| t.id == task_id) {
        tracing::debug!(task = %task_id, "drag start on unknown task ignored");
        return None;
    }

    let task_ids: Vec<TaskId> = if selection.contains(&task_id) {
        selection.to_vec()
    } else {
        vec![task_id]
    };

    let origins = task_ids
        .iter()
        .filter_map(|id| {
            tasks.iter().find(|t| t.id == *id).map(|t| {
                (
                    t.id,
                    Origin {
                        start_day: t.start_day,
                        slot: t.slot,
                    },
                )
            })
        })
        .collect();

    tracing::debug!(count = task_ids.len(), x = pointer.x, y = pointer.y, "drag started");

    Some(DragSession {
        task_ids,
        origin_pointer: pointer,
        origins,
        day_delta: 0,
        slot_delta: 0,
        snapped: HashMap::new(),
        contested: HashSet::new(),
    })
}

/// Apply a pointer move and return the tentative collection for live feedback.
pub fn update_drag(
    session: &mut DragSession,
    pointer: PointerPos,
    geometry: Geometry,
    tasks: &[Task],
) -> Vec<Task> {
    session.day_delta = geometry.day_delta(pointer.x - session.origin_pointer.x);
    session.slot_delta = geometry.slot_delta(pointer.y - session.origin_pointer.y);

    let (out, placements) = place_dragged(session, tasks, Resolve::Live);

    session.contested.clear();
    for (id, placement) in placements {
        if placement.escalated {
            session.contested.insert(id);
            session.snapped.entry(id).or_default().insert(placement.slot);
        }
    }

    tracing::trace!(
        days = session.day_delta,
        slots = session.slot_delta,
        contested = session.contested.len(),
        "drag moved"
    );
    out
}

/// Commit the session: resolve final slots from the last delta, then compact
/// every affected lane.
///
/// A task dragged only horizontally is re-seated in the lowest free slot, so
/// moving it back to where it came from also brings it back down.
///
/// The session is consumed whatever the outcome. On `Err` the caller keeps its
/// pre-commit collection.
pub fn end_drag(session: DragSession, tasks: &[Task]) -> Result<Vec<Task>, EngineError> {
    let (placed, _) = place_dragged(&session, tasks, Resolve::Commit);
    let lanes = session.lanes(&placed);
    let committed = compact_lanes(&placed, lanes.iter().copied());

    let affected: Vec<Task> = committed
        .iter()
        .filter(|t| lanes.contains(&t.lane_id))
        .cloned()
        .collect();
    verify_no_overlap(&affected)?;

    tracing::debug!(
        days = session.day_delta,
        slots = session.slot_delta,
        lanes = lanes.len(),
        "drag committed"
    );
    Ok(committed)
}

/// Abandon the session, putting every moved task back where it started.
pub fn cancel_drag(session: DragSession, tasks: &[Task]) -> Vec<Task> {
    tracing::debug!(count = session.task_ids.len(), "drag cancelled");
    tasks
        .iter()
        .map(|t| match session.origins.get(&t.id) {
            Some(origin) => Task {
                start_day: origin.start_day,
                slot: origin.slot,
                ..t.clone()
            },
            None => t.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolve {
    /// Keep the current (or pointed-at) slot whenever it is free.
    Live,
    /// Like `Live`, except horizontal-only moves fall back to first-fit.
    Commit,
}

/// Position every moved task from its origin plus the session delta.
///
/// Stationary tasks are claimed first; moved tasks are then placed in session
/// order, each claiming its slot before the next is placed.
fn place_dragged(
    session: &DragSession,
    tasks: &[Task],
    resolve: Resolve,
) -> (Vec<Task>, Vec<(TaskId, Placement)>) {
    let moving: HashSet<TaskId> = session.origins.keys().copied().collect();
    let mut out = tasks.to_vec();
    let mut lanes: HashMap<LaneId, Occupancy> = HashMap::new();
    let mut placements = Vec::with_capacity(session.task_ids.len());

    for id in &session.task_ids {
        let Some(idx) = out.iter().position(|t| t.id == *id) else {
            tracing::debug!(task = %id, "dragged task no longer exists, skipping");
            continue;
        };
        let Some(origin) = session.origins.get(id) else {
            tracing::debug!(task = %id, "no origin recorded for dragged task, skipping");
            continue;
        };

        let lane_id = out[idx].lane_id;
        let duration = out[idx].duration;
        let start = offset(origin.start_day, session.day_delta);
        let preferred = offset(origin.slot, session.slot_delta);

        let occupancy = lanes.entry(lane_id).or_insert_with(|| {
            Occupancy::from_tasks(tasks.iter().filter(|t| t.lane_id == lane_id), &moving)
        });
        let placement = if resolve == Resolve::Commit && session.slot_delta == 0 {
            let slot = occupancy.first_fit(start, duration);
            Placement {
                slot,
                escalated: slot != origin.slot,
            }
        } else {
            occupancy.place(start, duration, preferred)
        };
        occupancy.insert(placement.slot, start, duration);

        out[idx].start_day = start;
        out[idx].slot = placement.slot;
        placements.push((*id, placement));
    }

    (out, placements)
}

fn offset(base: u32, delta: i64) -> u32 {
    (base as i64 + delta).clamp(0, u32::MAX as i64) as u32
}

/// Owns the optional live session and enforces when one may start.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start a session unless one is already running or `task_id` is being renamed.
    pub fn begin(
        &mut self,
        task_id: TaskId,
        pointer: PointerPos,
        selection: &[TaskId],
        editing: Option<TaskId>,
        tasks: &[Task],
    ) -> bool {
        if self.session.is_some() || editing == Some(task_id) {
            return false;
        }
        self.session = begin_drag(task_id, pointer, selection, tasks);
        self.session.is_some()
    }

    /// Tentative collection for a pointer move, or `None` when idle.
    pub fn update(
        &mut self,
        pointer: PointerPos,
        geometry: Geometry,
        tasks: &[Task],
    ) -> Option<Vec<Task>> {
        let session = self.session.as_mut()?;
        Some(update_drag(session, pointer, geometry, tasks))
    }

    /// Commit and return to idle. The session is dropped before the commit runs.
    pub fn end(&mut self, tasks: &[Task]) -> Option<Result<Vec<Task>, EngineError>> {
        let session = self.session.take()?;
        Some(end_drag(session, tasks))
    }

    /// Restore origins and return to idle.
    pub fn cancel(&mut self, tasks: &[Task]) -> Option<Vec<Task>> {
        let session = self.session.take()?;
        Some(cancel_drag(session, tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    const DAY: f32 = 20.0;
    const SLOT: f32 = 48.0;

    fn geometry() -> Geometry {
        Geometry::new(DAY, SLOT)
    }

    fn find(tasks: &[Task], id: TaskId) -> &Task {
        tasks.iter().find(|t| t.id == id).unwrap()
    }

    /// Lane L1 with T1 [0,5) and T2 [10,15), both in slot 0.
    fn two_task_lane() -> (Vec<Task>, TaskId, TaskId) {
        let lane = Uuid::new_v4();
        let t1 = Task::new("T1", lane, 0, 5);
        let t2 = Task::new("T2", lane, 10, 5);
        let (a, b) = (t1.id, t2.id);
        (vec![t1, t2], a, b)
    }

    fn drag_by(tasks: &[Task], id: TaskId, selection: &[TaskId], dx: f32, dy: f32) -> Vec<Task> {
        let origin = PointerPos::new(100.0, 100.0);
        let mut session = begin_drag(id, origin, selection, tasks).unwrap();
        let live = update_drag(
            &mut session,
            PointerPos::new(100.0 + dx, 100.0 + dy),
            geometry(),
            tasks,
        );
        end_drag(session, &live).unwrap()
    }

    #[test]
    fn overlapping_move_escalates_to_next_slot() {
        let (tasks, t1, t2) = two_task_lane();
        let out = drag_by(&tasks, t1, &[], 8.0 * DAY, 0.0);
        assert_eq!(find(&out, t1).start_day, 8);
        assert_eq!(find(&out, t1).slot, 1);
        assert_eq!(find(&out, t2).slot, 0);
    }

    #[test]
    fn moving_back_within_one_session_restores_original() {
        let (tasks, t1, _) = two_task_lane();
        let mut session = begin_drag(t1, PointerPos::new(0.0, 0.0), &[], &tasks).unwrap();

        let live = update_drag(&mut session, PointerPos::new(8.0 * DAY, 0.0), geometry(), &tasks);
        assert_eq!(find(&live, t1).slot, 1);
        assert!(session.is_contested(t1));
        assert!(session.snapped_slots(t1).unwrap().contains(&1));

        let live = update_drag(&mut session, PointerPos::new(0.0, 0.0), geometry(), &live);
        assert_eq!(find(&live, t1).slot, 0);
        assert!(!session.is_contested(t1));

        let out = end_drag(session, &live).unwrap();
        assert_eq!(out, tasks);
    }

    #[test]
    fn moving_back_in_a_second_drag_restores_original() {
        let (tasks, t1, t2) = two_task_lane();
        let moved = drag_by(&tasks, t1, &[], 8.0 * DAY, 0.0);
        assert_eq!((find(&moved, t1).start_day, find(&moved, t1).slot), (8, 1));
        assert_eq!(find(&moved, t2).slot, 0);

        let back = drag_by(&moved, t1, &[], -8.0 * DAY, 0.0);
        assert_eq!(back, tasks);
    }

    #[test]
    fn horizontal_commit_drops_to_lowest_free_slot() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let b = Task::new("b", lane, 0, 5).with_slot(1);
        let c = Task::new("c", lane, 0, 5).with_slot(2);
        let (a_id, c_id) = (a.id, c.id);
        let tasks = vec![a, b, c];

        let mut session = begin_drag(c_id, PointerPos::default(), &[], &tasks).unwrap();
        let live = update_drag(&mut session, PointerPos::new(10.0 * DAY, 0.0), geometry(), &tasks);
        // Live feedback keeps the row under the pointer.
        assert_eq!(find(&live, c_id).slot, 2);

        let out = end_drag(session, &live).unwrap();
        assert_eq!(find(&out, c_id).slot, 0);
        assert_eq!(find(&out, a_id).slot, 0);
        assert_eq!(verify_no_overlap(&out), Ok(()));
    }

    #[test]
    fn start_day_is_floored_at_zero() {
        let (tasks, _, t2) = two_task_lane();
        let out = drag_by(&tasks, t2, &[], -40.0 * DAY, 0.0);
        // [0,5) collides with T1 in slot 0.
        assert_eq!(find(&out, t2).start_day, 0);
        assert_eq!(find(&out, t2).slot, 1);
    }

    #[test]
    fn vertical_drag_targets_slot_when_free() {
        let (tasks, t1, _) = two_task_lane();
        let out = drag_by(&tasks, t1, &[], 0.0, 1.4 * SLOT);
        // round(1.4) == 1, and slot 1 is empty.
        assert_eq!(find(&out, t1).slot, 1);
        let out = drag_by(&tasks, t1, &[], 0.0, -3.0 * SLOT);
        assert_eq!(find(&out, t1).slot, 0);
    }

    #[test]
    fn vertical_drag_into_contested_slot_falls_back_to_first_fit() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 10);
        let b = Task::new("b", lane, 0, 10).with_slot(1);
        let (a_id, b_id) = (a.id, b.id);
        let tasks = vec![a, b];
        // Drag b onto slot 0, which a occupies.
        let out = drag_by(&tasks, b_id, &[], 0.0, -SLOT);
        assert_eq!(find(&out, a_id).slot, 0);
        assert_eq!(find(&out, b_id).slot, 1);
    }

    #[test]
    fn commit_compacts_emptied_rows() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let b = Task::new("b", lane, 0, 5).with_slot(1);
        let (a_id, b_id) = (a.id, b.id);
        let tasks = vec![a, b];
        let out = drag_by(&tasks, a_id, &[], 10.0 * DAY, 2.0 * SLOT);
        assert_eq!(find(&out, b_id).slot, 0);
        assert_eq!(find(&out, a_id).slot, 1);
        assert_eq!(find(&out, a_id).start_day, 10);
    }

    #[test]
    fn selection_moves_as_rigid_group() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 2, 3);
        let b = Task::new("b", lane, 6, 4);
        let c = Task::new("c", lane, 30, 2);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        let tasks = vec![a, b, c];
        let out = drag_by(&tasks, a_id, &[a_id, b_id], 3.0 * DAY, 0.0);
        assert_eq!(find(&out, a_id).start_day, 5);
        assert_eq!(find(&out, b_id).start_day, 9);
        assert_eq!(find(&out, c_id).start_day, 30);
    }

    #[test]
    fn unselected_task_drags_alone() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 2, 3);
        let b = Task::new("b", lane, 10, 4);
        let (a_id, b_id) = (a.id, b.id);
        let session = begin_drag(a_id, PointerPos::default(), &[b_id], &[a, b]).unwrap();
        assert_eq!(session.task_ids(), &[a_id]);
    }

    #[test]
    fn clamped_group_members_do_not_share_a_slot() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 3);
        let b = Task::new("b", lane, 3, 3);
        let (a_id, b_id) = (a.id, b.id);
        let tasks = vec![a, b];
        let out = drag_by(&tasks, a_id, &[a_id, b_id], -10.0 * DAY, 0.0);
        assert_eq!(find(&out, a_id).start_day, 0);
        assert_eq!(find(&out, b_id).start_day, 0);
        assert_ne!(find(&out, a_id).slot, find(&out, b_id).slot);
        assert_eq!(verify_no_overlap(&out), Ok(()));
    }

    #[test]
    fn missing_task_is_skipped_others_commit() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 3);
        let b = Task::new("b", lane, 10, 3);
        let (a_id, b_id) = (a.id, b.id);
        let tasks = vec![a.clone(), b];
        let mut session =
            begin_drag(a_id, PointerPos::default(), &[a_id, b_id], &tasks).unwrap();
        // b disappears mid-drag.
        let without_b = vec![a];
        let live = update_drag(&mut session, PointerPos::new(DAY * 2.0, 0.0), geometry(), &without_b);
        let out = end_drag(session, &live).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(find(&out, a_id).start_day, 2);
    }

    #[test]
    fn unknown_clicked_task_opens_no_session() {
        let (tasks, _, _) = two_task_lane();
        assert!(begin_drag(Uuid::new_v4(), PointerPos::default(), &[], &tasks).is_none());
    }

    #[test]
    fn degenerate_geometry_leaves_tasks_in_place() {
        let (tasks, t1, _) = two_task_lane();
        let mut session = begin_drag(t1, PointerPos::default(), &[], &tasks).unwrap();
        let live = update_drag(
            &mut session,
            PointerPos::new(500.0, 500.0),
            Geometry::new(0.0, f32::NAN),
            &tasks,
        );
        assert_eq!(live, tasks);
        assert_eq!((session.day_delta, session.slot_delta), (0, 0));
    }

    #[test]
    fn cancel_restores_origins() {
        let (tasks, t1, _) = two_task_lane();
        let mut controller = DragController::default();
        assert!(controller.begin(t1, PointerPos::default(), &[], None, &tasks));
        let live = controller
            .update(PointerPos::new(8.0 * DAY, 0.0), geometry(), &tasks)
            .unwrap();
        assert_eq!(find(&live, t1).slot, 1);
        let restored = controller.cancel(&live).unwrap();
        assert_eq!(restored, tasks);
        assert!(!controller.is_active());
    }

    #[test]
    fn controller_refuses_task_in_rename_mode() {
        let (tasks, t1, _) = two_task_lane();
        let mut controller = DragController::default();
        assert!(!controller.begin(t1, PointerPos::default(), &[], Some(t1), &tasks));
        assert!(controller.update(PointerPos::default(), geometry(), &tasks).is_none());
        assert!(controller.end(&tasks).is_none());
    }

    #[test]
    fn controller_returns_to_idle_after_commit() {
        let (tasks, t1, _) = two_task_lane();
        let mut controller = DragController::default();
        assert!(controller.begin(t1, PointerPos::default(), &[], None, &tasks));
        assert!(!controller.begin(t1, PointerPos::default(), &[], None, &tasks));
        let committed = controller.end(&tasks).unwrap().unwrap();
        assert_eq!(committed, tasks);
        assert!(!controller.is_active());
    }

    #[test]
    fn commit_reports_preexisting_overlap_in_affected_lane() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let b = Task::new("b", lane, 2, 5);
        let c = Task::new("c", lane, 20, 5);
        let c_id = c.id;
        let tasks = vec![a, b, c];
        let session = begin_drag(c_id, PointerPos::default(), &[], &tasks).unwrap();
        assert!(matches!(
            end_drag(session, &tasks),
            Err(EngineError::InvariantViolation { .. })
        ));
    }

    /// A lane built by inserting random tasks with first-fit, so it starts valid.
    fn arb_packed_lane() -> impl Strategy<Value = Vec<Task>> {
        prop::collection::vec((0u32..30, 1u32..8), 1..10).prop_map(|entries| {
            let lane = Uuid::from_u128(1);
            let mut occupancy = Occupancy::default();
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (start, duration))| {
                    let slot = occupancy.first_fit(start, duration);
                    occupancy.insert(slot, start, duration);
                    Task::new(format!("t{i}"), lane, start, duration).with_slot(slot)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn committed_drag_never_leaves_overlap(
            tasks in arb_packed_lane(),
            pick in prop::collection::vec(any::<bool>(), 10),
            dx in -400.0f32..400.0,
            dy in -200.0f32..200.0,
        ) {
            let selection: Vec<TaskId> = tasks
                .iter()
                .zip(pick.iter())
                .filter(|(_, p)| **p)
                .map(|(t, _)| t.id)
                .collect();
            let grabbed = selection.first().copied().unwrap_or(tasks[0].id);
            let out = drag_by(&tasks, grabbed, &selection, dx, dy);
            prop_assert_eq!(verify_no_overlap(&out), Ok(()));
            prop_assert_eq!(out.len(), tasks.len());
        }

        #[test]
        fn group_offset_ignores_event_granularity(
            tasks in arb_packed_lane(),
            days in -10i64..10,
            steps in 1usize..10,
        ) {
            let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
            let target = PointerPos::new(days as f32 * DAY, 0.0);

            let mut one = begin_drag(ids[0], PointerPos::default(), &ids, &tasks).unwrap();
            let single = update_drag(&mut one, target, geometry(), &tasks);

            let mut many = begin_drag(ids[0], PointerPos::default(), &ids, &tasks).unwrap();
            let mut live = tasks.clone();
            for step in 1..=steps {
                let x = target.x * step as f32 / steps as f32;
                live = update_drag(&mut many, PointerPos::new(x, 0.0), geometry(), &live);
            }
            prop_assert_eq!(&single, &live);

            for (before, after) in tasks.iter().zip(live.iter()) {
                let expected = (before.start_day as i64 + days).max(0) as u32;
                prop_assert_eq!(after.start_day, expected);
            }
        }
    }
}
