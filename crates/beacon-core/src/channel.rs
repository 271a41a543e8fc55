//! Interfaces the simulation provides to one agent for one round.
//!
//! The core only calls these. Delivery delay, sensing range and movement
//! legality all live on the other side.

use std::collections::BTreeSet;

use beacon_protocol::{DecodeContext, GridPos, Message, Registry, UnitKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AgentId, RoundContext};

/// One agent's view of the shared slot board.
///
/// A value written with [`set_own_slot`](Self::set_own_slot) in round `N` may
/// not be readable by neighbors before round `N + 1`. Nothing acknowledges a
/// read.
pub trait BroadcastChannel {
    type Agent: AgentId;

    fn set_own_slot(&mut self, value: u32);

    /// `None` when `neighbor` is not observable this round.
    fn read_slot(&self, neighbor: Self::Agent) -> Option<u32>;

    fn is_neighbor_observable(&self, neighbor: Self::Agent) -> bool;

    fn observable_neighbors(&self) -> BTreeSet<Self::Agent>;
}

/// Local perception.
pub trait Sensor: BroadcastChannel {
    fn own_position(&self) -> GridPos;

    fn locate(&self, neighbor: Self::Agent) -> Option<GridPos>;

    fn sensed_enemies(&self) -> Vec<Sighting>;

    /// Whether `position` is currently inside sensing range.
    fn can_sense(&self, position: GridPos) -> bool;
}

/// Movement directives. Each call reports whether the simulation accepted it.
pub trait Motor {
    fn try_move_toward(&mut self, target: GridPos) -> bool;

    fn try_move_heading(&mut self, degrees: u16) -> bool;
}

pub trait Environment: Sensor + Motor {}

impl<T: Sensor + Motor> Environment for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sighting {
    pub unit_kind: UnitKind,
    pub position: GridPos,
}

/// Messages decoded from observable neighbors this round, in neighbor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox<A> {
    pub messages: Vec<(A, Message)>,
    pub rejected: usize,
}

impl<A: AgentId> Inbox<A> {
    pub fn first(&self, wanted: Message) -> Option<A> {
        self.messages
            .iter()
            .find(|(_, message)| *message == wanted)
            .map(|(neighbor, _)| *neighbor)
    }

    pub fn senders(&self, wanted: Message) -> impl Iterator<Item = A> + '_ {
        self.messages
            .iter()
            .filter(move |(_, message)| *message == wanted)
            .map(|(neighbor, _)| *neighbor)
    }
}

/// Reads and decodes every observable neighbor's slot.
///
/// Undecodable flags are logged and dropped; they never abort the round.
pub fn read_inbox<E>(
    ctx: &RoundContext,
    agent: E::Agent,
    registry: &Registry,
    env: &E,
) -> Inbox<E::Agent>
where
    E: Sensor + ?Sized,
{
    let decode_ctx = DecodeContext::at(env.own_position());
    let mut inbox = Inbox {
        messages: Vec::new(),
        rejected: 0,
    };

    for neighbor in env.observable_neighbors() {
        let Some(raw) = env.read_slot(neighbor) else {
            continue;
        };
        match registry.decode(raw, &decode_ctx) {
            Ok(Message::Empty) => {}
            Ok(message) => inbox.messages.push((neighbor, message)),
            Err(err) => {
                inbox.rejected += 1;
                warn!(
                    round = ctx.round,
                    agent = ?agent,
                    neighbor = ?neighbor,
                    raw,
                    error = %err,
                    "rejected neighbor flag"
                );
            }
        }
    }
    inbox
}
