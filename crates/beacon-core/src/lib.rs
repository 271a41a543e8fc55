//! Coordination over a one-slot, one-round-delayed, unacknowledged broadcast channel.
//!
//! Each agent runs one [`Coordinator`] step per round: read neighbor slots,
//! decode, update local state, issue a movement [`Directive`], and write its own
//! slot from an [`Outbox`] that keeps every value latched long enough to be seen.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod channel;
pub mod commander;
pub mod config;
pub mod coordinator;
pub mod directive;
pub mod error;
pub mod outbox;
pub mod role;
pub mod round;
pub mod squad;
pub mod target;

pub use agent::AgentId;
pub use channel::{read_inbox, BroadcastChannel, Environment, Inbox, Motor, Sensor, Sighting};
pub use commander::Commander;
pub use config::CoordinationConfig;
pub use coordinator::{Coordinator, StepReport};
pub use directive::Directive;
pub use error::{ConfigError, CoordError, TrackError};
pub use outbox::Outbox;
pub use role::{Assignment, Role};
pub use round::RoundContext;
pub use squad::SquadCoordinator;
pub use target::{dispatch_rank, Target, TargetQueue};
