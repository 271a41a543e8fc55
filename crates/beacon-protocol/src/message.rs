//! The closed set of messages agents exchange through their slot.

use serde::{Deserialize, Serialize};

use crate::coord::GridPos;
use crate::kind::{Enumerated, UnitKind};

/// Decoded meaning of a broadcast slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Nothing to say. An unset slot (`0`) decodes to this.
    Empty,
    LeaderClaim,
    FollowerClaim,
    PatrolAssignment {
        outbound_direction_degrees: u16,
    },
    AttackAssignment {
        target: GridPos,
    },
    EnemySighted {
        unit_kind: UnitKind,
        position: GridPos,
    },
    TargetMissing {
        position: GridPos,
    },
    /// Reserved. Registered so the opcode stays stable; never sent.
    BaseSighted {
        position: GridPos,
    },
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Empty => MessageKind::Empty,
            Message::LeaderClaim => MessageKind::LeaderClaim,
            Message::FollowerClaim => MessageKind::FollowerClaim,
            Message::PatrolAssignment { .. } => MessageKind::PatrolAssignment,
            Message::AttackAssignment { .. } => MessageKind::AttackAssignment,
            Message::EnemySighted { .. } => MessageKind::EnemySighted,
            Message::TargetMissing { .. } => MessageKind::TargetMissing,
            Message::BaseSighted { .. } => MessageKind::BaseSighted,
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Message::PatrolAssignment { .. } | Message::AttackAssignment { .. }
        )
    }
}

/// Variant tag of a [`Message`], in opcode order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Empty,
    LeaderClaim,
    FollowerClaim,
    PatrolAssignment,
    AttackAssignment,
    EnemySighted,
    TargetMissing,
    BaseSighted,
}

impl Enumerated for MessageKind {
    const VARIANTS: &'static [Self] = &[
        MessageKind::Empty,
        MessageKind::LeaderClaim,
        MessageKind::FollowerClaim,
        MessageKind::PatrolAssignment,
        MessageKind::AttackAssignment,
        MessageKind::EnemySighted,
        MessageKind::TargetMissing,
        MessageKind::BaseSighted,
    ];

    fn ordinal(self) -> u32 {
        self as u32
    }
}
