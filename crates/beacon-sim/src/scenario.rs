//! Scenario description, loaded from YAML.

use std::path::Path;

use beacon_core::CoordinationConfig;
use beacon_protocol::{GridPos, ProtocolConfig, UnitKind};
use serde::{Deserialize, Serialize};

use crate::SimError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub unit_kind: UnitKind,
    pub position: GridPos,
    #[serde(default)]
    pub despawn_round: Option<u64>,
}

/// A reproducible world: same config and seed, same run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub rounds: u64,

    /// One immobile commander per entry.
    pub commanders: Vec<GridPos>,

    /// Squad agents, spread round-robin over the commanders.
    pub squad_agents: u32,

    /// Squad agents spawn within this many cells of their commander.
    pub spawn_radius: u32,

    /// Sensing radius of every agent.
    pub sense_radius: u32,

    pub enemies: Vec<EnemySpec>,

    /// Extra enemies placed uniformly at random on free cells.
    pub random_enemies: u32,

    /// Agents removed from the world, as `[agent, round]` pairs.
    pub removals: Vec<(u64, u64)>,

    pub coordination: CoordinationConfig,
    pub protocol: ProtocolConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            width: 48,
            height: 48,
            rounds: 60,
            commanders: vec![GridPos::new(24, 24)],
            squad_agents: 6,
            spawn_radius: 3,
            sense_radius: 5,
            enemies: vec![
                EnemySpec {
                    unit_kind: UnitKind::Soldier,
                    position: GridPos::new(27, 27),
                    despawn_round: Some(30),
                },
                EnemySpec {
                    unit_kind: UnitKind::Tower,
                    position: GridPos::new(20, 26),
                    despawn_round: None,
                },
            ],
            random_enemies: 0,
            removals: Vec::new(),
            coordination: CoordinationConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.coordination.validate(&self.protocol)?;

        if self.width <= 0 || self.height <= 0 {
            return Err(SimError::Scenario(format!(
                "world size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.commanders.is_empty() && self.squad_agents > 0 {
            return Err(SimError::Scenario(
                "squad agents need at least one commander to spawn around".into(),
            ));
        }
        if self.sense_radius == 0 {
            return Err(SimError::Scenario("sense_radius must be at least 1".into()));
        }
        if self.sense_radius > self.coordination.max_sensor_radius {
            return Err(SimError::Scenario(format!(
                "sense_radius {} exceeds coordination.max_sensor_radius {}",
                self.sense_radius, self.coordination.max_sensor_radius
            )));
        }
        Ok(())
    }
}
