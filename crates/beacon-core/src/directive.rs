use beacon_protocol::GridPos;
use serde::Serialize;

use crate::{Assignment, Motor};

/// What an agent asks the simulation to do with its movement this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    Hold,
    Follow { toward: GridPos },
    Advance { target: GridPos },
    Patrol { heading: u16 },
}

impl Directive {
    pub fn from_assignment(assignment: Option<Assignment>) -> Self {
        match assignment {
            Some(Assignment::Patrol {
                outbound_direction_degrees,
            }) => Directive::Patrol {
                heading: outbound_direction_degrees,
            },
            Some(Assignment::Attack { target }) => Directive::Advance { target },
            None => Directive::Hold,
        }
    }

    /// Issues the directive. `Hold` issues nothing and reports `false`.
    pub fn issue<M: Motor + ?Sized>(&self, motor: &mut M) -> bool {
        match *self {
            Directive::Hold => false,
            Directive::Follow { toward } => motor.try_move_toward(toward),
            Directive::Advance { target } => motor.try_move_toward(target),
            Directive::Patrol { heading } => motor.try_move_heading(heading),
        }
    }
}
