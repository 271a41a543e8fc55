use beacon_protocol::{GridPos, Message};
use serde::Serialize;

/// Coordination role.
///
/// Squad agents start `Unassigned` and move once to `Leader` or `Follower`;
/// base agents are `Commander` for their whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role<A> {
    Unassigned,
    Leader,
    Follower { leader: A },
    Commander,
}

impl<A> Role<A> {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Unassigned => "unassigned",
            Role::Leader => "leader",
            Role::Follower { .. } => "follower",
            Role::Commander => "commander",
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Role::Unassigned)
    }
}

/// Movement directive handed out by a commander; stored once per agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Patrol { outbound_direction_degrees: u16 },
    Attack { target: GridPos },
}

impl Assignment {
    pub fn from_message(message: &Message) -> Option<Self> {
        match message {
            Message::PatrolAssignment {
                outbound_direction_degrees,
            } => Some(Assignment::Patrol {
                outbound_direction_degrees: *outbound_direction_degrees,
            }),
            Message::AttackAssignment { target } => Some(Assignment::Attack { target: *target }),
            _ => None,
        }
    }

    pub fn to_message(self) -> Message {
        match self {
            Assignment::Patrol {
                outbound_direction_degrees,
            } => Message::PatrolAssignment {
                outbound_direction_degrees,
            },
            Assignment::Attack { target } => Message::AttackAssignment { target },
        }
    }
}
