use beacon_core::ConfigError;
use beacon_protocol::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build flag registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid scenario: {0}")]
    Scenario(String),
    #[error("no free cell for agent {agent} within {radius} of {anchor}")]
    Placement {
        agent: u64,
        anchor: beacon_protocol::GridPos,
        radius: u32,
    },
}
