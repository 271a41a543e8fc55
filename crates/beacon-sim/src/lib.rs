//! In-memory reference world for beacon coordination.
//!
//! Provides what the coordination core treats as external: a delayed,
//! range-limited slot board, a grid with movement legality and sensing, and a
//! scheduler that steps every agent once per round.

#![forbid(unsafe_code)]

pub mod board;
pub mod error;
pub mod scenario;
pub mod sim;
pub mod world;

pub use board::SlotBoard;
pub use error::SimError;
pub use scenario::{EnemySpec, ScenarioConfig};
pub use sim::{AgentSummary, CommanderQueue, RoundSummary, Simulation, SimulationSummary};
pub use world::{AgentView, Body, Enemy, GridWorld};
