//! First-fit assignment of tasks to virtual lanes (slots) inside a swim lane.
//!
//! A slot accepts a task when none of its occupants overlap the task's day
//! range. The caller's preferred slot wins when it is free; otherwise slots are
//! scanned upward from 0 and the first free one is taken. One past the highest
//! occupied slot is always free, so the scan terminates.

use std::collections::{BTreeMap, HashSet};

use crate::error::EngineError;
use crate::model::{Task, TaskId};

use super::overlap::overlaps;

/// Outcome of a slot search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub slot: u32,
    /// True when the preferred slot was contested and first-fit picked another.
    pub escalated: bool,
}

#[derive(Debug, Clone, Copy)]
struct Occupant {
    slot: u32,
    start: u32,
    duration: u32,
}

/// Day ranges already claimed in one swim lane, by slot.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    occupants: Vec<Occupant>,
}

impl Occupancy {
    /// Collect occupants from `lane_tasks`, skipping every id in `exclude`.
    ///
    /// `lane_tasks` is expected to hold tasks of a single swim lane.
    pub fn from_tasks<'a>(
        lane_tasks: impl IntoIterator<Item = &'a Task>,
        exclude: &HashSet<TaskId>,
    ) -> Self {
        let occupants = lane_tasks
            .into_iter()
            .filter(|t| !exclude.contains(&t.id))
            .map(|t| Occupant {
                slot: t.slot,
                start: t.start_day,
                duration: t.duration,
            })
            .collect();
        Self { occupants }
    }

    /// Claim a range, e.g. for a dragged task that has already been placed.
    pub fn insert(&mut self, slot: u32, start: u32, duration: u32) {
        self.occupants.push(Occupant {
            slot,
            start,
            duration,
        });
    }

    pub fn is_free(&self, slot: u32, start: u32, duration: u32) -> bool {
        !self
            .occupants
            .iter()
            .any(|o| o.slot == slot && overlaps(start, duration, o.start, o.duration))
    }

    /// Lowest slot with no overlapping occupant.
    pub fn first_fit(&self, start: u32, duration: u32) -> u32 {
        let ceiling = self
            .occupants
            .iter()
            .map(|o| o.slot.saturating_add(1))
            .max()
            .unwrap_or(0);
        (0..ceiling)
            .find(|&slot| self.is_free(slot, start, duration))
            .unwrap_or(ceiling)
    }

    /// Keep `preferred` if it is free, otherwise fall back to [`Self::first_fit`].
    pub fn place(&self, start: u32, duration: u32, preferred: u32) -> Placement {
        if self.is_free(preferred, start, duration) {
            Placement {
                slot: preferred,
                escalated: false,
            }
        } else {
            Placement {
                slot: self.first_fit(start, duration),
                escalated: true,
            }
        }
    }
}

/// Slot for a task proposed at `[start, start + duration)` in the lane holding
/// `lane_tasks`, ignoring the tasks in `exclude` (normally the ones being moved).
pub fn assign_virtual_lane<'a>(
    lane_tasks: impl IntoIterator<Item = &'a Task>,
    exclude: &HashSet<TaskId>,
    start: u32,
    duration: u32,
    preferred: u32,
) -> u32 {
    Occupancy::from_tasks(lane_tasks, exclude)
        .place(start, duration, preferred)
        .slot
}

/// Check that no two tasks sharing a lane and slot overlap in time.
pub fn verify_no_overlap(tasks: &[Task]) -> Result<(), EngineError> {
    let mut rows: BTreeMap<(uuid::Uuid, u32), Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        rows.entry((task.lane_id, task.slot)).or_default().push(task);
    }
    for ((lane, slot), mut row) in rows {
        row.sort_by_key(|t| t.start_day);
        for pair in row.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if overlaps(a.start_day, a.duration, b.start_day, b.duration) {
                return Err(EngineError::InvariantViolation {
                    lane,
                    slot,
                    first: a.id,
                    second: b.id,
                });
            }
        }
    }
    Ok(())
}
