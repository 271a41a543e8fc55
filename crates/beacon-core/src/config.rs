//! Coordination tuning, loaded from YAML.

use std::path::Path;

use beacon_protocol::ProtocolConfig;
use serde::{Deserialize, Serialize};

use crate::{AgentId, ConfigError};

/// Timing and capacity parameters for the coordination state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Rounds between a slot write and the earliest round a neighbor can read it.
    #[serde(default = "default_delivery_delay")]
    pub delivery_delay_rounds: u32,

    /// Longest chain of receivers a latched value has to reach.
    #[serde(default = "default_relay_hops")]
    pub relay_hops: u32,

    /// Minimum rounds an unassigned agent listens before claiming leadership.
    #[serde(default = "default_election_wait")]
    pub election_wait_rounds: u32,

    /// Number of distinct election deadlines agents are spread across.
    #[serde(default = "default_stagger_slots")]
    pub election_stagger_slots: u32,

    /// Upper bound on any agent's sensing radius, in cells.
    #[serde(default = "default_sensor_radius")]
    pub max_sensor_radius: u32,

    /// Upper bound on cells an agent moves per round.
    #[serde(default = "default_speed")]
    pub max_speed_cells_per_round: u32,

    /// Heading increment between successive patrol assignments.
    #[serde(default = "default_heading_step")]
    pub patrol_heading_step_degrees: u16,

    /// Messages that may wait behind the one currently latched.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

fn default_delivery_delay() -> u32 {
    1
}
fn default_relay_hops() -> u32 {
    1
}
fn default_election_wait() -> u32 {
    2
}
fn default_stagger_slots() -> u32 {
    4
}
fn default_sensor_radius() -> u32 {
    5
}
fn default_speed() -> u32 {
    1
}
fn default_heading_step() -> u16 {
    45
}
fn default_outbox_capacity() -> usize {
    8
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            delivery_delay_rounds: default_delivery_delay(),
            relay_hops: default_relay_hops(),
            election_wait_rounds: default_election_wait(),
            election_stagger_slots: default_stagger_slots(),
            max_sensor_radius: default_sensor_radius(),
            max_speed_cells_per_round: default_speed(),
            patrol_heading_step_degrees: default_heading_step(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

impl CoordinationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Rounds a broadcast value stays latched.
    ///
    /// Latched in round `N`, the value is first observable at
    /// `N + delay * hops`; it is held through one more round after that.
    pub fn hold_rounds(&self) -> u32 {
        self.delivery_delay_rounds * self.relay_hops + 2
    }

    /// Rounds an unassigned agent listens before defaulting to leadership.
    ///
    /// Offsets are multiples of the delivery delay, so a claim made at one
    /// deadline is readable by agents whose deadline comes next.
    pub fn election_deadline(&self, agent: impl AgentId) -> u32 {
        let slot = agent.election_slot(self.election_stagger_slots);
        self.election_wait_rounds + slot * self.delivery_delay_rounds
    }

    /// Rounds between latching a report and the last round it is broadcast.
    ///
    /// A report taking the last free slot waits for the active message and
    /// every queued one, then is held itself.
    pub fn max_report_latency(&self) -> u32 {
        let capacity = u32::try_from(self.outbox_capacity).unwrap_or(u32::MAX);
        capacity.saturating_add(1).saturating_mul(self.hold_rounds())
    }

    /// Per-axis distance between a decoded coordinate and the receiver that
    /// reconstructs it, in the worst case.
    ///
    /// The longest path is enemy -> reporter -> commander -> squad agent, each
    /// hop within one sensor radius. The reporter keeps moving for
    /// [`max_report_latency`](Self::max_report_latency) rounds and the
    /// commander for [`hold_rounds`](Self::hold_rounds).
    pub fn max_relay_distance(&self) -> u32 {
        let moving = self
            .max_report_latency()
            .saturating_add(self.hold_rounds())
            .saturating_mul(self.max_speed_cells_per_round);
        self.max_sensor_radius.saturating_mul(3).saturating_add(moving)
    }

    pub fn validate(&self, protocol: &ProtocolConfig) -> Result<(), ConfigError> {
        protocol.validate()?;
        for (field, value) in [
            ("delivery_delay_rounds", self.delivery_delay_rounds),
            ("relay_hops", self.relay_hops),
            ("election_wait_rounds", self.election_wait_rounds),
            ("election_stagger_slots", self.election_stagger_slots),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        if self.outbox_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "outbox_capacity",
            });
        }
        if self.patrol_heading_step_degrees == 0 || self.patrol_heading_step_degrees >= 360 {
            return Err(ConfigError::HeadingStep(self.patrol_heading_step_degrees));
        }

        let needed = self.max_relay_distance();
        let available = protocol.max_unambiguous_distance();
        if needed > available {
            return Err(ConfigError::WindowTooSmall { needed, available });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use beacon_protocol::RegistryError;

    use super::*;

    #[test]
    fn defaults_fit_default_protocol() {
        let config = CoordinationConfig::default();
        assert_eq!(config.hold_rounds(), 3);
        assert_eq!(config.max_report_latency(), 27);
        assert_eq!(config.max_relay_distance(), 45);
        config.validate(&ProtocolConfig::default()).unwrap();
    }

    #[test]
    fn hold_scales_with_delay_and_hops() {
        let config = CoordinationConfig {
            delivery_delay_rounds: 2,
            relay_hops: 3,
            ..Default::default()
        };
        assert_eq!(config.hold_rounds(), 8);
    }

    #[test]
    fn deadlines_are_staggered_by_delivery_delay() {
        let config = CoordinationConfig {
            election_wait_rounds: 2,
            election_stagger_slots: 3,
            delivery_delay_rounds: 2,
            ..Default::default()
        };
        assert_eq!(config.election_deadline(0u64), 2);
        assert_eq!(config.election_deadline(1u64), 4);
        assert_eq!(config.election_deadline(2u64), 6);
        assert_eq!(config.election_deadline(3u64), 2);
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let config = CoordinationConfig::from_yaml_str(
            "election_wait_rounds: 5\nmax_sensor_radius: 4\n",
        )
        .unwrap();
        assert_eq!(config.election_wait_rounds, 5);
        assert_eq!(config.max_sensor_radius, 4);
        assert_eq!(config.delivery_delay_rounds, 1);
        assert_eq!(config.outbox_capacity, 8);
    }

    #[test]
    fn rejects_radius_the_window_cannot_resolve() {
        let config = CoordinationConfig {
            max_sensor_radius: 20,
            ..Default::default()
        };
        let err = config.validate(&ProtocolConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WindowTooSmall {
                needed: 90,
                available: 63
            }
        ));

        let small_window = ProtocolConfig {
            window_bits: 5,
            ..Default::default()
        };
        assert!(CoordinationConfig::default()
            .validate(&small_window)
            .is_err());
    }

    #[test]
    fn deep_outbox_counts_against_the_window() {
        let config = CoordinationConfig {
            max_sensor_radius: 15,
            outbox_capacity: 16,
            ..Default::default()
        };
        assert_eq!(config.max_report_latency(), 51);
        let err = config.validate(&ProtocolConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WindowTooSmall {
                needed: 99,
                available: 63
            }
        ));

        let shallow = CoordinationConfig {
            outbox_capacity: 2,
            ..config
        };
        assert_eq!(shallow.max_relay_distance(), 57);
        shallow.validate(&ProtocolConfig::default()).unwrap();
    }

    #[test]
    fn unusable_protocol_window_is_an_error() {
        for window_bits in [0, 16] {
            let protocol = ProtocolConfig {
                window_bits,
                ..Default::default()
            };
            assert!(matches!(
                CoordinationConfig::default().validate(&protocol),
                Err(ConfigError::Protocol(RegistryError::WindowBits(bits))) if bits == window_bits
            ));
        }
    }

    #[test]
    fn rejects_zero_timings() {
        let config = CoordinationConfig {
            delivery_delay_rounds: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(&ProtocolConfig::default()),
            Err(ConfigError::Zero {
                field: "delivery_delay_rounds"
            })
        ));

        let config = CoordinationConfig {
            patrol_heading_step_degrees: 360,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(&ProtocolConfig::default()),
            Err(ConfigError::HeadingStep(360))
        ));
    }
}
