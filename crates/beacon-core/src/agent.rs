use core::fmt::Debug;

/// Identity of an agent on the broadcast channel.
///
/// `Ord` fixes the order in which neighbors' slots are read, so the first
/// `LeaderClaim` or assignment an agent acts on is the one from the lowest
/// identifier. `stable_id` picks the agent's election slot: agents whose ids
/// differ modulo [`CoordinationConfig::election_stagger_slots`] default to
/// leadership in different rounds.
///
/// [`CoordinationConfig::election_stagger_slots`]: crate::CoordinationConfig::election_stagger_slots
pub trait AgentId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;

    /// Election slot in `0..slots`. Zero slots behave as one.
    fn election_slot(self, slots: u32) -> u32 {
        let slots = u64::from(slots.max(1));
        // Remainder is below `slots`, which fits in u32.
        (self.stable_id() % slots) as u32
    }
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        u64::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_wrap_by_stable_id() {
        let slots: Vec<u32> = (0u64..6).map(|id| id.election_slot(4)).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 0, 1]);
        assert_eq!(7u32.election_slot(4), 3);
    }

    #[test]
    fn zero_slots_put_everyone_in_the_first() {
        assert_eq!(9u64.election_slot(0), 0);
        assert_eq!(u64::MAX.election_slot(1), 0);
    }
}
