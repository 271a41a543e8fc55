//! Commander-side target tracking.
//!
//! Sightings arrive repeatedly and out of order from many reporters, so the
//! queue keys every live entry by coordinate: at most one target per cell.

use std::collections::BTreeMap;

use beacon_protocol::{GridPos, UnitKind};
use serde::Serialize;

use crate::TrackError;

/// Dispatch order of unit kinds; lower ranks leave the queue first.
pub fn dispatch_rank(kind: UnitKind) -> u8 {
    match kind {
        UnitKind::Base => 0,
        UnitKind::Tower => 1,
        UnitKind::Soldier => 2,
        UnitKind::Scout => 3,
        UnitKind::Worker => 4,
    }
}

/// A reported enemy. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    unit_kind: UnitKind,
    position: GridPos,
}

impl Target {
    pub const fn new(unit_kind: UnitKind, position: GridPos) -> Self {
        Self {
            unit_kind,
            position,
        }
    }

    pub fn unit_kind(&self) -> UnitKind {
        self.unit_kind
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn rank(&self) -> u8 {
        dispatch_rank(self.unit_kind)
    }
}

/// `(rank, insertion sequence)`: equal ranks leave in insertion order.
type QueueKey = (u8, u64);

/// Priority queue of targets with a per-coordinate claim.
///
/// Ordering is by [`dispatch_rank`], then by insertion order. Re-pushing a
/// coordinate (after removing it) counts as a fresh insertion.
#[derive(Debug, Clone, Default)]
pub struct TargetQueue {
    order: BTreeMap<QueueKey, Target>,
    claims: BTreeMap<GridPos, QueueKey>,
    next_seq: u64,
}

impl TargetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_claimed(&self, position: GridPos) -> bool {
        self.claims.contains_key(&position)
    }

    pub fn get(&self, position: GridPos) -> Option<&Target> {
        self.claims
            .get(&position)
            .and_then(|key| self.order.get(key))
    }

    pub fn push(&mut self, target: Target) -> Result<(), TrackError> {
        if self.is_claimed(target.position) {
            return Err(TrackError::AlreadyClaimed(target.position));
        }
        self.insert(target);
        Ok(())
    }

    /// Caller guarantees `target.position` is unclaimed.
    fn insert(&mut self, target: Target) {
        let key = (target.rank(), self.next_seq);
        self.next_seq += 1;
        self.order.insert(key, target);
        self.claims.insert(target.position, key);
    }

    pub fn peek(&self) -> Option<&Target> {
        self.order.first_key_value().map(|(_, target)| target)
    }

    pub fn pop(&mut self) -> Option<Target> {
        let (_, target) = self.order.pop_first()?;
        self.claims.remove(&target.position);
        Some(target)
    }

    pub fn remove_by_coordinate(&mut self, position: GridPos) -> Result<Target, TrackError> {
        let key = self
            .claims
            .remove(&position)
            .ok_or(TrackError::NotClaimed(position))?;
        self.order
            .remove(&key)
            .ok_or(TrackError::NotClaimed(position))
    }

    /// Applies an enemy sighting: a newer report at a claimed coordinate
    /// replaces the queued one. Returns the superseded target, if any.
    pub fn record_sighting(&mut self, target: Target) -> Option<Target> {
        let superseded = self.remove_by_coordinate(target.position).ok();
        self.insert(target);
        superseded
    }

    /// Applies a missing-target report. Unclaimed coordinates are a no-op.
    pub fn retract(&mut self, position: GridPos) -> Option<Target> {
        self.remove_by_coordinate(position).ok()
    }

    /// Live targets in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.order.values()
    }
}
