//! Wire-level protocol parameters.

use serde::{Deserialize, Serialize};

use crate::{RegistryError, MAX_CHANNEL_WIDTH, MAX_WINDOW_BITS};

/// Parameters both ends of the channel must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Total flag width in bits.
    pub channel_width_bits: u32,
    /// Bits per axis for window-encoded coordinates. The window is `2^window_bits` cells.
    pub window_bits: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            channel_width_bits: 24,
            window_bits: 7,
        }
    }
}

impl ProtocolConfig {
    /// Rejects widths no codec can be built for. Call before relying on
    /// [`window`](Self::window) arithmetic.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.channel_width_bits == 0 || self.channel_width_bits > MAX_CHANNEL_WIDTH {
            return Err(RegistryError::ChannelWidth(self.channel_width_bits));
        }
        if self.window_bits == 0 || self.window_bits > MAX_WINDOW_BITS {
            return Err(RegistryError::WindowBits(self.window_bits));
        }
        Ok(())
    }

    /// Size of the coordinate window along one axis.
    pub fn window(&self) -> u32 {
        1u32 << self.window_bits.min(16)
    }

    /// Largest absolute per-axis distance between a coordinate and the
    /// receiver's reference at which reconstruction stays exact.
    pub fn max_unambiguous_distance(&self) -> u32 {
        (self.window() / 2).saturating_sub(1)
    }
}
