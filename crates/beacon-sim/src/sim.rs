//! Round scheduler.

use std::collections::BTreeMap;

use beacon_core::{Coordinator, Role, RoundContext, StepReport, Target};
use beacon_protocol::{Enumerated, GridPos, Offset, Registry, UnitKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{Body, Enemy, GridWorld, ScenarioConfig, SimError, SlotBoard};

const PLACEMENT_ATTEMPTS: usize = 64;

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: u64,
    pub reports: Vec<StepReport<u64>>,
    /// Agents whose step failed; their action for the round was dropped.
    pub failed: Vec<u64>,
    pub despawned: Vec<Enemy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub id: u64,
    pub role: Role<u64>,
    pub position: GridPos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommanderQueue {
    pub commander: u64,
    pub targets: Vec<Target>,
}

/// End-of-run state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub rounds: u64,
    pub agents: Vec<AgentSummary>,
    pub queues: Vec<CommanderQueue>,
    pub rejected_flags: usize,
    pub failed_steps: usize,
}

impl SimulationSummary {
    pub fn count_role(&self, name: &str) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.role.name() == name)
            .count()
    }
}

/// Steps every live agent once per round, in id order.
///
/// A failing agent step is logged and skipped; the rest of the round runs.
#[derive(Debug)]
pub struct Simulation {
    registry: Registry,
    world: GridWorld,
    board: SlotBoard,
    coordinators: BTreeMap<u64, Coordinator<u64>>,
    removals: BTreeMap<u64, Vec<u64>>,
    round: u64,
    rejected_flags: usize,
    failed_steps: usize,
}

impl Simulation {
    pub fn new(registry: Registry, world: GridWorld, delivery_delay_rounds: u32) -> Self {
        Self {
            registry,
            world,
            board: SlotBoard::new(delivery_delay_rounds),
            coordinators: BTreeMap::new(),
            removals: BTreeMap::new(),
            round: 0,
            rejected_flags: 0,
            failed_steps: 0,
        }
    }

    /// Builds the world a scenario describes. Same scenario, same world.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, SimError> {
        scenario.validate()?;
        let registry = Registry::standard(&scenario.protocol)?;
        let coordination = &scenario.coordination;
        let mut sim = Self::new(
            registry,
            GridWorld::new(scenario.width, scenario.height),
            coordination.delivery_delay_rounds,
        );
        let mut rng = StdRng::seed_from_u64(scenario.seed);
        let mut next_id = 0u64;

        for &position in &scenario.commanders {
            let body = Body {
                position,
                sense_radius: scenario.sense_radius,
                mobile: false,
            };
            sim.add_agent(Coordinator::commander(next_id, coordination), body)?;
            next_id += 1;
        }

        for spec in &scenario.enemies {
            let enemy = Enemy {
                unit_kind: spec.unit_kind,
                position: spec.position,
                despawn_round: spec.despawn_round,
            };
            if !sim.world.add_enemy(enemy) {
                return Err(SimError::Scenario(format!(
                    "enemy cell {} is outside the map or occupied",
                    spec.position
                )));
            }
        }

        for index in 0..scenario.squad_agents as usize {
            let anchor = scenario.commanders[index % scenario.commanders.len()];
            let position = sim
                .free_cell_near(&mut rng, anchor, scenario.spawn_radius)
                .ok_or(SimError::Placement {
                    agent: next_id,
                    anchor,
                    radius: scenario.spawn_radius,
                })?;
            let body = Body {
                position,
                sense_radius: scenario.sense_radius,
                mobile: true,
            };
            sim.add_agent(Coordinator::squad(next_id, coordination), body)?;
            next_id += 1;
        }

        for index in 0..scenario.random_enemies {
            let placed = (0..PLACEMENT_ATTEMPTS).any(|_| {
                let position = GridPos::new(
                    rng.gen_range(0..scenario.width),
                    rng.gen_range(0..scenario.height),
                );
                let unit_kind = random_kind(&mut rng);
                sim.world.add_enemy(Enemy {
                    unit_kind,
                    position,
                    despawn_round: None,
                })
            });
            if !placed {
                warn!(index, "no free cell for random enemy");
            }
        }

        for &(agent, round) in &scenario.removals {
            sim.schedule_removal(agent, round);
        }

        info!(
            seed = scenario.seed,
            agents = sim.coordinators.len(),
            enemies = sim.world.enemies().count(),
            "scenario built"
        );
        Ok(sim)
    }

    pub fn add_agent(
        &mut self,
        coordinator: Coordinator<u64>,
        body: Body,
    ) -> Result<(), SimError> {
        let id = coordinator.id();
        if self.coordinators.contains_key(&id) || !self.world.spawn_agent(id, body) {
            return Err(SimError::Placement {
                agent: id,
                anchor: body.position,
                radius: 0,
            });
        }
        self.coordinators.insert(id, coordinator);
        Ok(())
    }

    /// Removes `agent` from the world at the start of `round`.
    pub fn schedule_removal(&mut self, agent: u64, round: u64) {
        self.removals.entry(round).or_default().push(agent);
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn coordinator(&self, id: u64) -> Option<&Coordinator<u64>> {
        self.coordinators.get(&id)
    }

    pub fn coordinators(&self) -> impl Iterator<Item = (&u64, &Coordinator<u64>)> {
        self.coordinators.iter()
    }

    pub fn step_round(&mut self) -> RoundSummary {
        self.round += 1;
        let ctx = RoundContext::new(self.round);
        self.apply_removals();

        let mut reports = Vec::new();
        let mut failed = Vec::new();
        for (&id, coordinator) in self.coordinators.iter_mut() {
            let mut view = self.world.view(&mut self.board, id);
            match coordinator.step(&ctx, &self.registry, &mut view) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    warn!(
                        round = ctx.round,
                        agent = id,
                        error = %err,
                        "agent step failed, action dropped"
                    );
                    failed.push(id);
                }
            }
        }
        self.board.commit();
        let despawned = self.world.despawn_enemies(self.round);

        self.rejected_flags += reports.iter().map(|report| report.rejected).sum::<usize>();
        self.failed_steps += failed.len();
        debug!(
            round = ctx.round,
            stepped = reports.len(),
            failed = failed.len(),
            "round complete"
        );

        RoundSummary {
            round: self.round,
            reports,
            failed,
            despawned,
        }
    }

    pub fn run(&mut self, rounds: u64) -> SimulationSummary {
        for _ in 0..rounds {
            self.step_round();
        }
        self.summary()
    }

    pub fn summary(&self) -> SimulationSummary {
        let agents = self
            .coordinators
            .iter()
            .filter_map(|(&id, coordinator)| {
                self.world.body(id).map(|body| AgentSummary {
                    id,
                    role: coordinator.role(),
                    position: body.position,
                })
            })
            .collect();
        let queues = self
            .coordinators
            .iter()
            .filter_map(|(&commander, coordinator)| {
                coordinator.targets().map(|queue| CommanderQueue {
                    commander,
                    targets: queue.iter().copied().collect(),
                })
            })
            .collect();

        SimulationSummary {
            rounds: self.round,
            agents,
            queues,
            rejected_flags: self.rejected_flags,
            failed_steps: self.failed_steps,
        }
    }

    fn apply_removals(&mut self) {
        let Some(agents) = self.removals.remove(&self.round) else {
            return;
        };
        for agent in agents {
            if self.world.remove_agent(agent).is_some() {
                self.board.clear(agent);
                self.coordinators.remove(&agent);
                info!(round = self.round, agent, "agent removed");
            }
        }
    }

    fn free_cell_near(&self, rng: &mut StdRng, anchor: GridPos, radius: u32) -> Option<GridPos> {
        let r = radius as i32;
        (0..PLACEMENT_ATTEMPTS)
            .map(|_| anchor + Offset::new(rng.gen_range(-r..=r), rng.gen_range(-r..=r)))
            .find(|position| self.world.is_free(*position))
    }
}

fn random_kind(rng: &mut StdRng) -> UnitKind {
    UnitKind::VARIANTS[rng.gen_range(0..UnitKind::VARIANTS.len())]
}
