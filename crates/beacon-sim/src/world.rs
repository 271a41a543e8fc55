//! Grid world: agent bodies, enemies, sensing and movement legality.

use std::collections::{BTreeMap, BTreeSet};

use beacon_core::{BroadcastChannel, Motor, Sensor, Sighting};
use beacon_protocol::{Direction, GridPos, Offset, UnitKind};
use serde::Serialize;
use tracing::{debug, trace};

use crate::SlotBoard;

/// Physical state of one coordinating agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Body {
    pub position: GridPos,
    pub sense_radius: u32,
    /// Bases never move.
    pub mobile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Enemy {
    pub unit_kind: UnitKind,
    pub position: GridPos,
    /// Round at the end of which the enemy disappears.
    pub despawn_round: Option<u64>,
}

/// Rectangular grid `[0, width) x [0, height)`. Each cell holds at most one
/// agent or enemy.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    height: i32,
    bodies: BTreeMap<u64, Body>,
    enemies: BTreeMap<GridPos, Enemy>,
}

impl GridWorld {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "world must be non-empty");
        Self {
            width,
            height,
            bodies: BTreeMap::new(),
            enemies: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, position: GridPos) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    pub fn is_free(&self, position: GridPos) -> bool {
        self.contains(position)
            && !self.enemies.contains_key(&position)
            && self.bodies.values().all(|body| body.position != position)
    }

    /// Places an agent. Returns `false` if the id is taken or the cell is not free.
    pub fn spawn_agent(&mut self, id: u64, body: Body) -> bool {
        if self.bodies.contains_key(&id) || !self.is_free(body.position) {
            return false;
        }
        self.bodies.insert(id, body);
        true
    }

    /// Removes an agent without notifying anyone.
    pub fn remove_agent(&mut self, id: u64) -> Option<Body> {
        self.bodies.remove(&id)
    }

    pub fn body(&self, id: u64) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn agent_ids(&self) -> Vec<u64> {
        self.bodies.keys().copied().collect()
    }

    pub fn add_enemy(&mut self, enemy: Enemy) -> bool {
        if !self.is_free(enemy.position) {
            return false;
        }
        self.enemies.insert(enemy.position, enemy);
        true
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    /// Removes enemies whose despawn round has passed.
    pub fn despawn_enemies(&mut self, round: u64) -> Vec<Enemy> {
        let expired: Vec<GridPos> = self
            .enemies
            .values()
            .filter(|enemy| enemy.despawn_round.is_some_and(|at| at <= round))
            .map(|enemy| enemy.position)
            .collect();
        expired
            .into_iter()
            .filter_map(|position| self.enemies.remove(&position))
            .inspect(|enemy| {
                debug!(
                    round,
                    unit_kind = ?enemy.unit_kind,
                    position = %enemy.position,
                    "enemy despawned"
                )
            })
            .collect()
    }

    /// Whether `observer` can currently see `other`: both alive, distinct,
    /// and within the observer's sensing radius.
    pub fn can_observe(&self, observer: u64, other: u64) -> bool {
        if observer == other {
            return false;
        }
        match (self.bodies.get(&observer), self.bodies.get(&other)) {
            (Some(a), Some(b)) => a.position.within_radius(b.position, a.sense_radius),
            _ => false,
        }
    }

    /// Moves `id` one king step. Fails on immobile agents, blocked cells and
    /// the map edge.
    pub fn step_agent(&mut self, id: u64, step: Offset) -> bool {
        let Some(body) = self.bodies.get(&id).copied() else {
            return false;
        };
        if !body.mobile || step == Offset::default() {
            return false;
        }
        let destination = body.position + step;
        if !self.is_free(destination) {
            trace!(agent = id, %destination, "move blocked");
            return false;
        }
        if let Some(body) = self.bodies.get_mut(&id) {
            body.position = destination;
        }
        true
    }

    pub fn view<'a>(&'a mut self, board: &'a mut SlotBoard, id: u64) -> AgentView<'a> {
        AgentView {
            id,
            world: self,
            board,
        }
    }
}

/// One agent's window onto the world for a single step.
pub struct AgentView<'a> {
    id: u64,
    world: &'a mut GridWorld,
    board: &'a mut SlotBoard,
}

impl AgentView<'_> {
    fn body(&self) -> Option<&Body> {
        self.world.body(self.id)
    }
}

impl BroadcastChannel for AgentView<'_> {
    type Agent = u64;

    fn set_own_slot(&mut self, value: u32) {
        self.board.write(self.id, value);
    }

    fn read_slot(&self, neighbor: u64) -> Option<u32> {
        if !self.is_neighbor_observable(neighbor) {
            return None;
        }
        self.board.visible(neighbor)
    }

    fn is_neighbor_observable(&self, neighbor: u64) -> bool {
        self.world.can_observe(self.id, neighbor)
    }

    fn observable_neighbors(&self) -> BTreeSet<u64> {
        self.world
            .bodies
            .keys()
            .copied()
            .filter(|other| self.world.can_observe(self.id, *other))
            .collect()
    }
}

impl Sensor for AgentView<'_> {
    fn own_position(&self) -> GridPos {
        self.body().map(|body| body.position).unwrap_or(GridPos::ORIGIN)
    }

    fn locate(&self, neighbor: u64) -> Option<GridPos> {
        if !self.is_neighbor_observable(neighbor) {
            return None;
        }
        self.world.body(neighbor).map(|body| body.position)
    }

    fn sensed_enemies(&self) -> Vec<Sighting> {
        self.world
            .enemies()
            .filter(|enemy| self.can_sense(enemy.position))
            .map(|enemy| Sighting {
                unit_kind: enemy.unit_kind,
                position: enemy.position,
            })
            .collect()
    }

    fn can_sense(&self, position: GridPos) -> bool {
        self.body()
            .is_some_and(|body| body.position.within_radius(position, body.sense_radius))
    }
}

impl Motor for AgentView<'_> {
    fn try_move_toward(&mut self, target: GridPos) -> bool {
        let offset = self.own_position().offset_to(target);
        match Direction::toward(offset) {
            Some(direction) => self.world.step_agent(self.id, direction.offset()),
            None => false,
        }
    }

    fn try_move_heading(&mut self, degrees: u16) -> bool {
        let direction = Direction::from_degrees(u32::from(degrees));
        self.world.step_agent(self.id, direction.offset())
    }
}
