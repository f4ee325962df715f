//! Copy-on-write edits of the task, lane and milestone collections.
//!
//! Every function takes a snapshot and returns a fresh collection; callers swap
//! it in whole.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Lane, LaneId, Milestone, Task, TaskColor, TaskId};

use super::virtual_lane::{assign_virtual_lane, Occupancy};

/// Days a duplicated task is shifted right of its source.
pub const COPY_OFFSET_DAYS: u32 = 2;
pub const DEFAULT_TASK_DURATION: u32 = 5;
pub const DEFAULT_MILESTONE_DAY: u32 = 30;

/// The ids an action on `target` applies to: the whole selection when the
/// target is part of it, otherwise the target alone.
pub fn action_targets(target: TaskId, selection: &[TaskId]) -> Vec<TaskId> {
    if selection.contains(&target) {
        selection.to_vec()
    } else {
        vec![target]
    }
}

pub fn rename_task(tasks: &[Task], id: TaskId, title: &str) -> Result<Vec<Task>, EngineError> {
    if !tasks.iter().any(|t| t.id == id) {
        return Err(EngineError::UnknownTask(id));
    }
    Ok(tasks
        .iter()
        .map(|t| {
            if t.id == id {
                Task {
                    title: title.to_string(),
                    ..t.clone()
                }
            } else {
                t.clone()
            }
        })
        .collect())
}

/// Remove `ids` and strip them from every surviving task's dependencies.
pub fn delete_tasks(tasks: &[Task], ids: &[TaskId]) -> Vec<Task> {
    let doomed: HashSet<TaskId> = ids.iter().copied().collect();
    let out: Vec<Task> = tasks
        .iter()
        .filter(|t| !doomed.contains(&t.id))
        .map(|t| {
            let mut t = t.clone();
            t.dependencies.retain(|d| !doomed.contains(d));
            t
        })
        .collect();
    tracing::info!(removed = tasks.len() - out.len(), "deleted tasks");
    out
}

/// Append a copy of each task in `ids`: fresh id, `" (Copy)"` title suffix,
/// shifted [`COPY_OFFSET_DAYS`] right, no dependencies.
///
/// Each copy keeps its source slot when that row is free at the new position and
/// otherwise takes the first free slot. Unknown ids are skipped.
pub fn copy_tasks(tasks: &[Task], ids: &[TaskId]) -> (Vec<Task>, Vec<TaskId>) {
    let mut out = tasks.to_vec();
    let mut created = Vec::new();

    for id in ids {
        let Some(source) = tasks.iter().find(|t| t.id == *id) else {
            tracing::debug!(task = %id, "copy of unknown task skipped");
            continue;
        };
        let start = source.start_day.saturating_add(COPY_OFFSET_DAYS);
        let occupancy = Occupancy::from_tasks(
            out.iter().filter(|t| t.lane_id == source.lane_id),
            &HashSet::new(),
        );
        let slot = occupancy.place(start, source.duration, source.slot).slot;

        let copy = Task {
            id: Uuid::new_v4(),
            title: format!("{} (Copy)", source.title),
            start_day: start,
            dependencies: Vec::new(),
            slot,
            ..source.clone()
        };
        created.push(copy.id);
        out.push(copy);
    }

    tracing::info!(copied = created.len(), "copied tasks");
    (out, created)
}

/// Apply `color` to every task in `ids`.
pub fn recolor_tasks(tasks: &[Task], ids: &[TaskId], color: TaskColor) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if ids.contains(&t.id) {
                t.clone().with_color(color)
            } else {
                t.clone()
            }
        })
        .collect()
}

/// Append a default task ("New Task", day 0, five days) to `lane_id`, in the
/// first slot free over that range.
pub fn add_task(tasks: &[Task], lane_id: LaneId) -> (Vec<Task>, TaskId) {
    let slot = assign_virtual_lane(
        tasks.iter().filter(|t| t.lane_id == lane_id),
        &HashSet::new(),
        0,
        DEFAULT_TASK_DURATION,
        0,
    );
    let task = Task::new("New Task", lane_id, 0, DEFAULT_TASK_DURATION)
        .with_color(TaskColor::Gray)
        .with_slot(slot);
    let id = task.id;

    let mut out = tasks.to_vec();
    out.push(task);
    tracing::info!(task = %id, lane = %lane_id, slot, "added task");
    (out, id)
}

/// Record that `task` depends on `dependency`. Self-links, unknown ids and
/// duplicates leave the collection unchanged.
pub fn add_dependency(tasks: &[Task], task: TaskId, dependency: TaskId) -> Vec<Task> {
    let known = |id: TaskId| tasks.iter().any(|t| t.id == id);
    if task == dependency || !known(task) || !known(dependency) {
        return tasks.to_vec();
    }
    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == task && !t.depends_on(dependency) {
                t.dependencies.push(dependency);
            }
            t
        })
        .collect()
}

pub fn remove_dependency(tasks: &[Task], task: TaskId, dependency: TaskId) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == task {
                t.dependencies.retain(|d| *d != dependency);
            }
            t
        })
        .collect()
}

pub fn add_lane(lanes: &[Lane]) -> Vec<Lane> {
    let mut out = lanes.to_vec();
    out.push(Lane::new(format!("New Lane {}", lanes.len() + 1)));
    out
}

pub fn toggle_lane(lanes: &[Lane], id: LaneId) -> Result<Vec<Lane>, EngineError> {
    if !lanes.iter().any(|l| l.id == id) {
        return Err(EngineError::UnknownLane(id));
    }
    Ok(lanes
        .iter()
        .map(|l| Lane {
            is_expanded: if l.id == id { !l.is_expanded } else { l.is_expanded },
            ..l.clone()
        })
        .collect())
}

pub fn add_milestone(milestones: &[Milestone]) -> Vec<Milestone> {
    let mut out = milestones.to_vec();
    out.push(Milestone::new("New Milestone", DEFAULT_MILESTONE_DAY));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::virtual_lane::verify_no_overlap;

    fn find(tasks: &[Task], id: TaskId) -> Option<&Task> {
        tasks.iter().find(|t| t.id == id)
    }

    #[test]
    fn delete_strips_dependency_edges() {
        let lane = Uuid::new_v4();
        let t1 = Task::new("T1", lane, 0, 5);
        let mut t2 = Task::new("T2", lane, 5, 5);
        let mut t3 = Task::new("T3", lane, 10, 5);
        t2.dependencies.push(t1.id);
        t3.dependencies = vec![t1.id, t2.id];
        let (id1, id2, id3) = (t1.id, t2.id, t3.id);

        let out = delete_tasks(&[t1, t2, t3], &[id1]);

        assert!(find(&out, id1).is_none());
        assert!(out.iter().all(|t| !t.depends_on(id1)));
        assert_eq!(find(&out, id3).unwrap().dependencies, vec![id2]);
    }

    #[test]
    fn delete_many_at_once() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let b = Task::new("b", lane, 5, 5);
        let mut c = Task::new("c", lane, 10, 5);
        c.dependencies = vec![a.id, b.id];
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        let out = delete_tasks(&[a, b, c], &[a_id, b_id]);
        assert_eq!(out.len(), 1);
        assert!(find(&out, c_id).unwrap().dependencies.is_empty());
    }

    #[test]
    fn copy_gets_fresh_id_offset_and_no_dependencies() {
        let lane = Uuid::new_v4();
        let x = Task::new("X", lane, 20, 3);
        let mut t1 = Task::new("T1", lane, 0, 5).with_color(TaskColor::Purple);
        t1.dependencies.push(x.id);
        let t1_id = t1.id;

        let (out, created) = copy_tasks(&[x, t1], &[t1_id]);

        assert_eq!(out.len(), 3);
        assert_eq!(created.len(), 1);
        let copy = find(&out, created[0]).unwrap();
        assert_ne!(copy.id, t1_id);
        assert_eq!(copy.title, "T1 (Copy)");
        assert_eq!(copy.start_day, 2);
        assert_eq!(copy.duration, 5);
        assert_eq!(copy.color, TaskColor::Purple);
        assert!(copy.dependencies.is_empty());
        // [2,7) overlaps the source in slot 0.
        assert_eq!(copy.slot, 1);
        assert_eq!(verify_no_overlap(&out), Ok(()));
    }

    #[test]
    fn copy_keeps_slot_when_free() {
        let lane = Uuid::new_v4();
        let t = Task::new("short", lane, 0, 2).with_slot(0);
        let id = t.id;
        let (out, created) = copy_tasks(&[t], &[id]);
        assert_eq!(find(&out, created[0]).unwrap().slot, 0);
    }

    #[test]
    fn recolor_applies_to_selection_only_when_target_selected() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let b = Task::new("b", lane, 5, 5);
        let c = Task::new("c", lane, 10, 5);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        let tasks = vec![a, b, c];
        let selection = vec![a_id, b_id];

        let out = recolor_tasks(&tasks, &action_targets(a_id, &selection), TaskColor::Red);
        assert_eq!(find(&out, a_id).unwrap().color, TaskColor::Red);
        assert_eq!(find(&out, b_id).unwrap().color, TaskColor::Red);
        assert_eq!(find(&out, c_id).unwrap().color, TaskColor::Blue);

        let out = recolor_tasks(&tasks, &action_targets(c_id, &selection), TaskColor::Pink);
        assert_eq!(find(&out, a_id).unwrap().color, TaskColor::Blue);
        assert_eq!(find(&out, c_id).unwrap().color, TaskColor::Pink);
    }

    #[test]
    fn rename_sets_title() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let id = a.id;
        let out = rename_task(&[a], id, "Kickoff").unwrap();
        assert_eq!(out[0].title, "Kickoff");
        let missing = Uuid::new_v4();
        assert_eq!(
            rename_task(&out, missing, "x"),
            Err(EngineError::UnknownTask(missing))
        );
    }

    #[test]
    fn add_task_uses_defaults_and_free_slot() {
        let lane = Uuid::new_v4();
        let existing = Task::new("busy", lane, 0, 10);
        let (out, id) = add_task(&[existing], lane);
        let added = find(&out, id).unwrap();
        assert_eq!(added.title, "New Task");
        assert_eq!(added.start_day, 0);
        assert_eq!(added.duration, DEFAULT_TASK_DURATION);
        assert_eq!(added.color, TaskColor::Gray);
        assert_eq!(added.lane_id, lane);
        assert_eq!(added.slot, 1);
    }

    #[test]
    fn dependency_links_are_deduplicated_and_validated() {
        let lane = Uuid::new_v4();
        let a = Task::new("a", lane, 0, 5);
        let b = Task::new("b", lane, 5, 5);
        let (a_id, b_id) = (a.id, b.id);
        let tasks = add_dependency(&[a, b], b_id, a_id);
        let tasks = add_dependency(&tasks, b_id, a_id);
        let tasks = add_dependency(&tasks, a_id, a_id);
        let tasks = add_dependency(&tasks, a_id, Uuid::new_v4());
        assert_eq!(find(&tasks, b_id).unwrap().dependencies, vec![a_id]);
        assert!(find(&tasks, a_id).unwrap().dependencies.is_empty());

        let tasks = remove_dependency(&tasks, b_id, a_id);
        assert!(find(&tasks, b_id).unwrap().dependencies.is_empty());
    }

    #[test]
    fn lanes_are_appended_and_toggled() {
        let lanes = add_lane(&[]);
        let lanes = add_lane(&lanes);
        assert_eq!(lanes[1].title, "New Lane 2");
        assert!(lanes[1].is_expanded);

        let toggled = toggle_lane(&lanes, lanes[0].id).unwrap();
        assert!(!toggled[0].is_expanded);
        assert!(toggled[1].is_expanded);
        assert!(toggle_lane(&lanes, Uuid::new_v4()).is_err());
    }

    #[test]
    fn milestone_defaults() {
        let ms = add_milestone(&[]);
        assert_eq!(ms[0].title, "New Milestone");
        assert_eq!(ms[0].day, DEFAULT_MILESTONE_DAY);
    }
}
