use std::collections::{BTreeMap, BTreeSet};

use crate::model::{LaneId, Task};

/// Renumber the slots used in `lane_id` so they form the contiguous range `0..k`.
///
/// Leading empty slots and interior gaps are both removed; occupied slots keep
/// their relative order, so tasks that shared a slot still share one and no new
/// overlaps can appear. Tasks of other lanes are returned untouched. Applying
/// this to an already compact lane returns an identical collection.
pub fn compact_lane(tasks: &[Task], lane_id: LaneId) -> Vec<Task> {
    let used: BTreeSet<u32> = tasks
        .iter()
        .filter(|t| t.lane_id == lane_id)
        .map(|t| t.slot)
        .collect();

    // Occupied slot -> its rank among occupied slots.
    let renumber: BTreeMap<u32, u32> = used
        .iter()
        .enumerate()
        .map(|(rank, &slot)| (slot, rank as u32))
        .collect();

    if renumber.iter().all(|(slot, rank)| slot == rank) {
        return tasks.to_vec();
    }

    tracing::debug!(lane = %lane_id, slots = ?used, "compacting lane");

    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.lane_id == lane_id {
                if let Some(&rank) = renumber.get(&t.slot) {
                    t.slot = rank;
                }
            }
            t
        })
        .collect()
}

/// Compact every lane in `lanes`.
pub fn compact_lanes(tasks: &[Task], lanes: impl IntoIterator<Item = LaneId>) -> Vec<Task> {
    lanes
        .into_iter()
        .fold(tasks.to_vec(), |acc, lane| compact_lane(&acc, lane))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn slots(tasks: &[Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.slot).collect()
    }

    #[test]
    fn leading_empty_slots_are_removed() {
        let lane = Uuid::new_v4();
        let tasks = vec![
            Task::new("a", lane, 0, 5).with_slot(2),
            Task::new("b", lane, 0, 5).with_slot(3),
        ];
        assert_eq!(slots(&compact_lane(&tasks, lane)), vec![0, 1]);
    }

    #[test]
    fn interior_gaps_are_closed() {
        let lane = Uuid::new_v4();
        let tasks = vec![
            Task::new("a", lane, 0, 5),
            Task::new("b", lane, 0, 5).with_slot(2),
            Task::new("c", lane, 8, 5).with_slot(2),
            Task::new("d", lane, 0, 5).with_slot(5),
        ];
        assert_eq!(slots(&compact_lane(&tasks, lane)), vec![0, 1, 1, 2]);
    }

    #[test]
    fn other_lanes_are_untouched() {
        let lane = Uuid::new_v4();
        let other = Uuid::new_v4();
        let tasks = vec![
            Task::new("a", lane, 0, 5).with_slot(1),
            Task::new("b", other, 0, 5).with_slot(4),
        ];
        let out = compact_lane(&tasks, lane);
        assert_eq!(slots(&out), vec![0, 4]);
        assert_eq!(slots(&compact_lanes(&tasks, [lane, other])), vec![0, 0]);
    }

    #[test]
    fn compact_lane_is_a_no_op_when_already_compact() {
        let lane = Uuid::new_v4();
        let tasks = vec![
            Task::new("a", lane, 0, 5),
            Task::new("b", lane, 2, 5).with_slot(1),
        ];
        assert_eq!(compact_lane(&tasks, lane), tasks);
    }

    fn arb_lane_tasks() -> impl Strategy<Value = (Uuid, Vec<Task>)> {
        prop::collection::vec((0u32..40, 1u32..10, 0u32..8), 0..12).prop_map(|entries| {
            let lane = Uuid::from_u128(7);
            let tasks = entries
                .into_iter()
                .enumerate()
                .map(|(i, (start, duration, slot))| {
                    Task::new(format!("t{i}"), lane, start, duration).with_slot(slot)
                })
                .collect();
            (lane, tasks)
        })
    }

    proptest! {
        #[test]
        fn compaction_is_idempotent((lane, tasks) in arb_lane_tasks()) {
            let once = compact_lane(&tasks, lane);
            let twice = compact_lane(&once, lane);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn compaction_leaves_no_gaps((lane, tasks) in arb_lane_tasks()) {
            let out = compact_lane(&tasks, lane);
            let used: BTreeSet<u32> = out.iter().map(|t| t.slot).collect();
            let expected: BTreeSet<u32> = (0..used.len() as u32).collect();
            prop_assert_eq!(used, expected);
        }

        #[test]
        fn compaction_keeps_slot_mates_together((lane, tasks) in arb_lane_tasks()) {
            let out = compact_lane(&tasks, lane);
            for (i, a) in tasks.iter().enumerate() {
                for (j, b) in tasks.iter().enumerate() {
                    prop_assert_eq!(a.slot == b.slot, out[i].slot == out[j].slot);
                    prop_assert_eq!(a.slot < b.slot, out[i].slot < out[j].slot);
                }
            }
        }
    }
}
