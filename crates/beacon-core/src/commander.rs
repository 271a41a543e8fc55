use std::collections::BTreeMap;

use beacon_protocol::{Message, Registry};
use tracing::{debug, info, trace};

use crate::{
    read_inbox, AgentId, Assignment, CoordError, CoordinationConfig, Directive, Environment,
    Outbox, Role, RoundContext, StepReport, Target, TargetQueue,
};

/// Base-side coordinator: collects sighting reports and hands out
/// assignments, one per latch window.
///
/// A reporter holds each value for several rounds; the commander applies it
/// once, on the first round it is read from that sender.
#[derive(Debug, Clone)]
pub struct Commander<A: AgentId> {
    id: A,
    targets: TargetQueue,
    heard: BTreeMap<A, Message>,
    outbox: Outbox,
    heading_step: u16,
    next_heading: u16,
}

impl<A: AgentId> Commander<A> {
    pub fn new(id: A, config: &CoordinationConfig) -> Self {
        Self {
            id,
            targets: TargetQueue::new(),
            heard: BTreeMap::new(),
            outbox: Outbox::new(config.hold_rounds(), config.outbox_capacity),
            heading_step: config.patrol_heading_step_degrees,
            next_heading: 0,
        }
    }

    pub fn id(&self) -> A {
        self.id
    }

    pub fn targets(&self) -> &TargetQueue {
        &self.targets
    }

    /// Heading the next patrol assignment will carry.
    pub fn next_heading(&self) -> u16 {
        self.next_heading
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
        let inbox = read_inbox(ctx, self.id, registry, &*env);

        let heard: BTreeMap<A, Message> = inbox.messages.iter().copied().collect();
        for (from, message) in &inbox.messages {
            if self.heard.get(from) == Some(message) {
                continue;
            }
            match *message {
                Message::EnemySighted {
                    unit_kind,
                    position,
                } => {
                    let superseded = self
                        .targets
                        .record_sighting(Target::new(unit_kind, position));
                    debug!(
                        round = ctx.round,
                        from = ?from,
                        ?unit_kind,
                        %position,
                        replaced = superseded.is_some(),
                        "target recorded"
                    );
                }
                Message::TargetMissing { position } => {
                    if let Some(target) = self.targets.retract(position) {
                        debug!(
                            round = ctx.round,
                            from = ?from,
                            %position,
                            unit_kind = ?target.unit_kind(),
                            "target retracted"
                        );
                    }
                }
                Message::BaseSighted { position } => {
                    trace!(round = ctx.round, from = ?from, %position, "base sighting ignored");
                }
                _ => {}
            }
        }

        self.heard = heard;

        if self.outbox.is_idle() {
            let assignment = self.dispatch();
            self.outbox.latch(assignment.to_message());
            info!(round = ctx.round, agent = ?self.id, ?assignment, "assignment dispatched");
        }

        let broadcast = self.outbox.next_round();
        let raw = registry.encode(&broadcast)?;
        env.set_own_slot(raw);

        Ok(StepReport {
            round: ctx.round,
            agent: self.id,
            role: Role::Commander,
            accepted: inbox.messages.len(),
            rejected: inbox.rejected,
            broadcast,
            directive: Directive::Hold,
            moved: false,
        })
    }

    /// Highest-priority target if one is queued, otherwise a patrol on the
    /// next heading in rotation.
    fn dispatch(&mut self) -> Assignment {
        if let Some(target) = self.targets.pop() {
            return Assignment::Attack {
                target: target.position(),
            };
        }
        let heading = self.next_heading;
        self.next_heading = (heading + self.heading_step) % 360;
        Assignment::Patrol {
            outbound_direction_degrees: heading,
        }
    }
}
