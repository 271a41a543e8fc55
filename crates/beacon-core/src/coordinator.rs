use beacon_protocol::{Message, Registry};
use serde::Serialize;

use crate::{
    AgentId, Commander, CoordError, CoordinationConfig, Directive, Environment, Role,
    RoundContext, SquadCoordinator, TargetQueue,
};

/// Outcome of one agent's round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport<A> {
    pub round: u64,
    pub agent: A,
    pub role: Role<A>,
    /// Non-empty neighbor messages decoded this round.
    pub accepted: usize,
    /// Neighbor flags that failed to decode.
    pub rejected: usize,
    pub broadcast: Message,
    pub directive: Directive,
    pub moved: bool,
}

/// Per-agent coordination logic, dispatched on the agent's kind.
#[derive(Debug, Clone)]
pub enum Coordinator<A: AgentId> {
    Squad(SquadCoordinator<A>),
    Commander(Commander<A>),
}

impl<A: AgentId> Coordinator<A> {
    pub fn squad(id: A, config: &CoordinationConfig) -> Self {
        Coordinator::Squad(SquadCoordinator::new(id, config))
    }

    pub fn commander(id: A, config: &CoordinationConfig) -> Self {
        Coordinator::Commander(Commander::new(id, config))
    }

    pub fn id(&self) -> A {
        match self {
            Coordinator::Squad(squad) => squad.id(),
            Coordinator::Commander(commander) => commander.id(),
        }
    }

    pub fn role(&self) -> Role<A> {
        match self {
            Coordinator::Squad(squad) => squad.role(),
            Coordinator::Commander(_) => Role::Commander,
        }
    }

    pub fn targets(&self) -> Option<&TargetQueue> {
        match self {
            Coordinator::Squad(_) => None,
            Coordinator::Commander(commander) => Some(commander.targets()),
        }
    }

    pub fn step<E>(
        &mut self,
        ctx: &RoundContext,
        registry: &Registry,
        env: &mut E,
    ) -> Result<StepReport<A>, CoordError>
    where
        E: Environment<Agent = A> + ?Sized,
    {
        match self {
            Coordinator::Squad(squad) => squad.step(ctx, registry, env),
            Coordinator::Commander(commander) => commander.step(ctx, registry, env),
        }
    }
}
