//! Squad agent lifecycle: election, squad membership, assignment, reporting.

use std::collections::{BTreeMap, BTreeSet};

use beacon_protocol::{GridPos, Message, Registry, UnitKind};
use tracing::{debug, info};

use crate::{
    read_inbox, AgentId, Assignment, CoordError, CoordinationConfig, Directive, Environment,
    Inbox, Outbox, Role, RoundContext, StepReport,
};

/// State machine for an agent that belongs to a combat squad.
///
/// `Unassigned -> Follower` as soon as a neighbor's `LeaderClaim` or an
/// assignment is decoded, with the sender as leader. `Unassigned -> Leader`
/// once the agent has listened for its whole election window without decoding
/// either. Both outcomes are final.
///
/// Sightings are only reported once the role is settled, so a role claim is
/// never queued behind them.
#[derive(Debug, Clone)]
pub struct SquadCoordinator<A: AgentId> {
    id: A,
    role: Role<A>,
    election_deadline: u32,
    first_round: Option<u64>,
    promoted_round: Option<u64>,
    assignment: Option<Assignment>,
    assigned_by: Option<A>,
    squad: BTreeSet<A>,
    reported: BTreeMap<GridPos, UnitKind>,
    outbox: Outbox,
}

impl<A: AgentId> SquadCoordinator<A> {
    pub fn new(id: A, config: &CoordinationConfig) -> Self {
        Self {
            id,
            role: Role::Unassigned,
            election_deadline: config.election_deadline(id),
            first_round: None,
            promoted_round: None,
            assignment: None,
            assigned_by: None,
            squad: BTreeSet::new(),
            reported: BTreeMap::new(),
            outbox: Outbox::new(config.hold_rounds(), config.outbox_capacity),
        }
    }

    pub fn id(&self) -> A {
        self.id
    }

    pub fn role(&self) -> Role<A> {
        self.role
    }

    pub fn leader(&self) -> Option<A> {
        match self.role {
            Role::Follower { leader } => Some(leader),
            Role::Leader => Some(self.id),
            _ => None,
        }
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    /// Followers a leader currently observes. Empty for every other role.
    pub fn squad(&self) -> &BTreeSet<A> {
        &self.squad
    }

    /// Rounds this agent listens before defaulting to leadership.
    pub fn election_deadline(&self) -> u32 {
        self.election_deadline
    }

    /// Coordinates this agent has reported and not yet retracted.
    pub fn reported(&self) -> &BTreeMap<GridPos, UnitKind> {
        &self.reported
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
        let first_round = *self.first_round.get_or_insert(ctx.round);
        let inbox = read_inbox(ctx, self.id, registry, &*env);

        self.update_role(ctx, first_round, &inbox);
        self.update_squad(&inbox, &*env);
        self.take_assignment(ctx, &inbox);
        self.report_sightings(&*env);

        let broadcast = self.outbox.next_round();
        let raw = registry.encode(&broadcast)?;

        let directive = self.directive(&*env);
        let moved = directive.issue(&mut *env);
        env.set_own_slot(raw);

        Ok(StepReport {
            round: ctx.round,
            agent: self.id,
            role: self.role,
            accepted: inbox.messages.len(),
            rejected: inbox.rejected,
            broadcast,
            directive,
            moved,
        })
    }

    fn update_role(&mut self, ctx: &RoundContext, first_round: u64, inbox: &Inbox<A>) {
        if !self.role.is_unassigned() {
            return;
        }

        let leader = inbox
            .first(Message::LeaderClaim)
            .or_else(|| first_assignment(inbox).map(|(from, _)| from));
        if let Some(leader) = leader {
            self.role = Role::Follower { leader };
            self.promoted_round = Some(ctx.round);
            self.outbox.latch_next(Message::FollowerClaim);
            info!(round = ctx.round, agent = ?self.id, leader = ?leader, "joined squad");
            return;
        }

        let listened = ctx.rounds_inclusive_since(first_round);
        if listened >= u64::from(self.election_deadline) {
            self.role = Role::Leader;
            self.promoted_round = Some(ctx.round);
            self.outbox.set_idle(Message::LeaderClaim);
            self.outbox.latch_next(Message::LeaderClaim);
            info!(
                round = ctx.round,
                agent = ?self.id,
                listened,
                "no leader claim heard, claiming leadership"
            );
        }
    }

    fn update_squad<E>(&mut self, inbox: &Inbox<A>, env: &E)
    where
        E: Environment<Agent = A> + ?Sized,
    {
        if self.role != Role::Leader {
            return;
        }
        self.squad
            .retain(|member| env.is_neighbor_observable(*member));
        for member in inbox.senders(Message::FollowerClaim) {
            if self.squad.insert(member) {
                debug!(agent = ?self.id, member = ?member, "squad member announced");
            }
        }
    }

    fn accepts_assignment(&self, ctx: &RoundContext) -> bool {
        if self.assignment.is_some() {
            return false;
        }
        match (self.role, self.promoted_round) {
            (Role::Unassigned, _) => true,
            (Role::Leader | Role::Follower { .. }, Some(promoted)) => {
                ctx.round.saturating_sub(promoted) < u64::from(self.outbox.hold_rounds())
            }
            _ => false,
        }
    }

    fn take_assignment(&mut self, ctx: &RoundContext, inbox: &Inbox<A>) {
        if !self.accepts_assignment(ctx) {
            return;
        }
        if let Some((from, assignment)) = first_assignment(inbox) {
            self.assignment = Some(assignment);
            self.assigned_by = Some(from);
            info!(
                round = ctx.round,
                agent = ?self.id,
                from = ?from,
                ?assignment,
                "assignment stored"
            );
        }
    }

    fn report_sightings<E>(&mut self, env: &E)
    where
        E: Environment<Agent = A> + ?Sized,
    {
        if self.role.is_unassigned() {
            return;
        }
        let sensed: BTreeMap<GridPos, UnitKind> = env
            .sensed_enemies()
            .into_iter()
            .map(|sighting| (sighting.position, sighting.unit_kind))
            .collect();

        for (&position, &unit_kind) in &sensed {
            if self.reported.get(&position) == Some(&unit_kind) {
                continue;
            }
            let message = Message::EnemySighted {
                unit_kind,
                position,
            };
            if self.outbox.latch(message) {
                self.reported.insert(position, unit_kind);
            }
        }

        let gone: Vec<GridPos> = self
            .reported
            .keys()
            .filter(|position| !sensed.contains_key(position) && env.can_sense(**position))
            .copied()
            .collect();
        for position in gone {
            if self.outbox.latch(Message::TargetMissing { position }) {
                self.reported.remove(&position);
            }
        }
    }

    /// A follower tracks its leader while it is observable and falls back to
    /// its own assignment otherwise. An agent that joined through an
    /// assignment carries it out rather than trailing the sender.
    fn directive<E>(&self, env: &E) -> Directive
    where
        E: Environment<Agent = A> + ?Sized,
    {
        if let Role::Follower { leader } = self.role {
            if self.assigned_by != Some(leader) && env.is_neighbor_observable(leader) {
                if let Some(toward) = env.locate(leader) {
                    return Directive::Follow { toward };
                }
            }
        }
        Directive::from_assignment(self.assignment)
    }
}

fn first_assignment<A: AgentId>(inbox: &Inbox<A>) -> Option<(A, Assignment)> {
    inbox
        .messages
        .iter()
        .find_map(|(from, message)| Assignment::from_message(message).map(|a| (*from, a)))
}
