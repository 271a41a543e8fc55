/// Per-round input handed to every agent step by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundContext {
    pub round: u64,
}

impl RoundContext {
    pub const fn new(round: u64) -> Self {
        Self { round }
    }

    /// Rounds elapsed since `earlier`, counting both ends.
    pub fn rounds_inclusive_since(&self, earlier: u64) -> u64 {
        self.round.saturating_sub(earlier) + 1
    }
}
