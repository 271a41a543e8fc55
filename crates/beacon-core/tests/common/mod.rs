#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use beacon_core::{
    BroadcastChannel, Coordinator, CoordinationConfig, Motor, RoundContext, Sensor, Sighting,
    StepReport,
};
use beacon_protocol::{GridPos, Message, ProtocolConfig, Registry};

pub fn registry() -> Registry {
    Registry::standard(&ProtocolConfig::default()).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCall {
    Toward(GridPos),
    Heading(u16),
}

/// Hand-built view of the world for one agent.
#[derive(Debug, Clone)]
pub struct ScriptedEnv {
    pub position: GridPos,
    pub sense_radius: u32,
    /// Readable slots of observable neighbors.
    pub slots: BTreeMap<u64, u32>,
    pub positions: BTreeMap<u64, GridPos>,
    pub enemies: Vec<Sighting>,
    pub own_slot: Option<u32>,
    pub moves: Vec<MoveCall>,
}

impl ScriptedEnv {
    pub fn at(position: GridPos) -> Self {
        Self {
            position,
            sense_radius: 5,
            slots: BTreeMap::new(),
            positions: BTreeMap::new(),
            enemies: Vec::new(),
            own_slot: None,
            moves: Vec::new(),
        }
    }

    pub fn neighbor(&mut self, id: u64, position: GridPos, raw: u32) -> &mut Self {
        self.slots.insert(id, raw);
        self.positions.insert(id, position);
        self
    }

    pub fn broadcast(&mut self, registry: &Registry, id: u64, position: GridPos, message: Message) {
        let raw = registry.encode(&message).unwrap();
        self.neighbor(id, position, raw);
    }

    pub fn clear_neighbors(&mut self) {
        self.slots.clear();
        self.positions.clear();
    }

    pub fn sent(&self, registry: &Registry) -> Message {
        let raw = self.own_slot.expect("agent never wrote its slot");
        registry
            .decode(raw, &beacon_protocol::DecodeContext::at(self.position))
            .unwrap()
    }
}

impl BroadcastChannel for ScriptedEnv {
    type Agent = u64;

    fn set_own_slot(&mut self, value: u32) {
        self.own_slot = Some(value);
    }

    fn read_slot(&self, neighbor: u64) -> Option<u32> {
        self.slots.get(&neighbor).copied()
    }

    fn is_neighbor_observable(&self, neighbor: u64) -> bool {
        self.slots.contains_key(&neighbor)
    }

    fn observable_neighbors(&self) -> BTreeSet<u64> {
        self.slots.keys().copied().collect()
    }
}

impl Sensor for ScriptedEnv {
    fn own_position(&self) -> GridPos {
        self.position
    }

    fn locate(&self, neighbor: u64) -> Option<GridPos> {
        self.positions.get(&neighbor).copied()
    }

    fn sensed_enemies(&self) -> Vec<Sighting> {
        self.enemies
            .iter()
            .filter(|sighting| self.can_sense(sighting.position))
            .copied()
            .collect()
    }

    fn can_sense(&self, position: GridPos) -> bool {
        self.position.within_radius(position, self.sense_radius)
    }
}

impl Motor for ScriptedEnv {
    fn try_move_toward(&mut self, target: GridPos) -> bool {
        self.moves.push(MoveCall::Toward(target));
        true
    }

    fn try_move_heading(&mut self, degrees: u16) -> bool {
        self.moves.push(MoveCall::Heading(degrees));
        true
    }
}

/// Agents that all observe each other, with a one-round slot delay.
pub struct Mesh {
    pub registry: Registry,
    pub round: u64,
    pub agents: BTreeMap<u64, (Coordinator<u64>, GridPos)>,
    /// Enemies every agent may sense, subject to its radius.
    pub enemies: Vec<Sighting>,
    visible: BTreeMap<u64, u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            registry: registry(),
            round: 0,
            agents: BTreeMap::new(),
            enemies: Vec::new(),
            visible: BTreeMap::new(),
        }
    }

    pub fn squad(mut self, id: u64, position: GridPos, config: &CoordinationConfig) -> Self {
        self.agents
            .insert(id, (Coordinator::squad(id, config), position));
        self
    }

    pub fn commander(mut self, id: u64, position: GridPos, config: &CoordinationConfig) -> Self {
        self.agents
            .insert(id, (Coordinator::commander(id, config), position));
        self
    }

    pub fn step(&mut self) -> Vec<StepReport<u64>> {
        self.round += 1;
        let ctx = RoundContext::new(self.round);
        let positions: BTreeMap<u64, GridPos> = self
            .agents
            .iter()
            .map(|(id, (_, position))| (*id, *position))
            .collect();

        let mut written = BTreeMap::new();
        let mut reports = Vec::new();
        for (id, (coordinator, position)) in self.agents.iter_mut() {
            let mut env = ScriptedEnv::at(*position);
            env.enemies.clone_from(&self.enemies);
            for (other, raw) in &self.visible {
                if other != id {
                    env.neighbor(*other, positions[other], *raw);
                }
            }
            reports.push(coordinator.step(&ctx, &self.registry, &mut env).unwrap());
            if let Some(raw) = env.own_slot {
                written.insert(*id, raw);
            }
        }
        self.visible = written;
        reports
    }

    pub fn run(&mut self, rounds: u64) {
        for _ in 0..rounds {
            self.step();
        }
    }

    pub fn coordinator(&self, id: u64) -> &Coordinator<u64> {
        &self.agents[&id].0
    }
}
