use std::collections::BTreeMap;

use beacon_core::{dispatch_rank, Target, TargetQueue, TrackError};
use beacon_protocol::{Enumerated, GridPos, UnitKind};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Sighted(UnitKind, GridPos),
    Missing(GridPos),
    Pop,
}

fn unit_kind() -> impl Strategy<Value = UnitKind> {
    (0..UnitKind::VARIANTS.len()).prop_map(|i| UnitKind::VARIANTS[i])
}

fn cell() -> impl Strategy<Value = GridPos> {
    (0i32..6, 0i32..6).prop_map(|(x, y)| GridPos::new(x, y))
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (unit_kind(), cell()).prop_map(|(kind, pos)| Op::Sighted(kind, pos)),
        2 => cell().prop_map(Op::Missing),
        1 => Just(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn at_most_one_target_per_coordinate(ops in prop::collection::vec(op(), 0..80)) {
        let mut queue = TargetQueue::new();
        // Cell -> (kind, order of its latest sighting).
        let mut model: BTreeMap<GridPos, (UnitKind, u64)> = BTreeMap::new();
        let mut seq = 0u64;

        for op in ops {
            match op {
                Op::Sighted(kind, pos) => {
                    queue.record_sighting(Target::new(kind, pos));
                    model.insert(pos, (kind, seq));
                    seq += 1;
                }
                Op::Missing(pos) => {
                    queue.retract(pos);
                    model.remove(&pos);
                }
                Op::Pop => {
                    let first = model
                        .iter()
                        .min_by_key(|(_, (kind, order))| (dispatch_rank(*kind), *order))
                        .map(|(pos, (kind, _))| Target::new(*kind, *pos));
                    prop_assert_eq!(queue.pop(), first);
                    if let Some(target) = first {
                        model.remove(&target.position());
                    }
                }
            }

            prop_assert_eq!(queue.len(), model.len());
            for (pos, (kind, _)) in &model {
                prop_assert!(queue.is_claimed(*pos));
                prop_assert_eq!(queue.get(*pos).map(Target::unit_kind), Some(*kind));
            }
        }
    }

    #[test]
    fn pops_in_rank_then_insertion_order(
        sightings in prop::collection::btree_map(cell(), unit_kind(), 0..20),
    ) {
        let mut queue = TargetQueue::new();
        let mut inserted = Vec::new();
        for (pos, kind) in &sightings {
            queue.push(Target::new(*kind, *pos)).unwrap();
            inserted.push((dispatch_rank(*kind), inserted.len(), *pos));
        }
        inserted.sort();

        let popped: Vec<GridPos> = std::iter::from_fn(|| queue.pop())
            .map(|target| target.position())
            .collect();
        let expected: Vec<GridPos> = inserted.into_iter().map(|(_, _, pos)| pos).collect();
        prop_assert_eq!(popped, expected);
    }
}

#[test]
fn later_sighting_at_same_coordinate_replaces_earlier() {
    let mut queue = TargetQueue::new();
    let cell = GridPos::new(3, -2);

    assert_eq!(queue.record_sighting(Target::new(UnitKind::Worker, cell)), None);
    let superseded = queue.record_sighting(Target::new(UnitKind::Soldier, cell));

    assert_eq!(superseded, Some(Target::new(UnitKind::Worker, cell)));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.get(cell).map(Target::unit_kind), Some(UnitKind::Soldier));
}

#[test]
fn missing_report_for_unclaimed_coordinate_is_a_no_op() {
    let mut queue = TargetQueue::new();
    queue
        .push(Target::new(UnitKind::Scout, GridPos::new(1, 1)))
        .unwrap();

    assert_eq!(queue.retract(GridPos::new(9, 9)), None);
    assert_eq!(queue.len(), 1);
    assert_eq!(
        queue.remove_by_coordinate(GridPos::new(9, 9)),
        Err(TrackError::NotClaimed(GridPos::new(9, 9)))
    );
    assert_eq!(
        queue.peek().map(Target::position),
        Some(GridPos::new(1, 1))
    );
}
