use beacon_protocol::{EncodeError, GridPos, RegistryError};
use thiserror::Error;

/// Failure of one agent's step. The scheduler drops that agent's action for
/// the round and carries on.
#[derive(Debug, Error)]
pub enum CoordError {
    #[error("failed to encode outgoing flag: {0}")]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("coordinate {0} is already claimed by a queued target")]
    AlreadyClaimed(GridPos),
    #[error("coordinate {0} is not claimed")]
    NotClaimed(GridPos),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid protocol config: {0}")]
    Protocol(#[from] RegistryError),
    #[error("`{field}` must be at least 1")]
    Zero { field: &'static str },
    #[error("patrol heading step {0} must be in 1..360")]
    HeadingStep(u16),
    #[error(
        "relayed coordinates may drift {needed} cells from a receiver but the protocol window only resolves {available}"
    )]
    WindowTooSmall { needed: u32, available: u32 },
}
