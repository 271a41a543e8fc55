use std::collections::{BTreeMap, VecDeque};

/// Shared broadcast slots with a fixed delivery delay.
///
/// Writes overwrite the writer's slot immediately, but readers only see the
/// board as it stood `delay` commits ago.
#[derive(Debug, Clone)]
pub struct SlotBoard {
    delay: usize,
    current: BTreeMap<u64, u32>,
    committed: VecDeque<BTreeMap<u64, u32>>,
}

impl SlotBoard {
    pub fn new(delay_rounds: u32) -> Self {
        assert!(delay_rounds > 0, "delivery delay must be at least one round");
        Self {
            delay: delay_rounds as usize,
            current: BTreeMap::new(),
            committed: VecDeque::new(),
        }
    }

    pub fn write(&mut self, agent: u64, value: u32) {
        self.current.insert(agent, value);
    }

    /// Value of `agent`'s slot as visible this round.
    pub fn visible(&self, agent: u64) -> Option<u32> {
        if self.committed.len() < self.delay {
            return None;
        }
        self.committed
            .front()
            .and_then(|snapshot| snapshot.get(&agent).copied())
    }

    /// Value `agent` wrote most recently, visible to nobody yet.
    pub fn latest(&self, agent: u64) -> Option<u32> {
        self.current.get(&agent).copied()
    }

    /// Ends the round.
    pub fn commit(&mut self) {
        self.committed.push_back(self.current.clone());
        while self.committed.len() > self.delay {
            self.committed.pop_front();
        }
    }

    /// Drops `agent`'s slot. Snapshots already committed keep the value,
    /// readers filter on observability.
    pub fn clear(&mut self, agent: u64) {
        self.current.remove(&agent);
    }
}
