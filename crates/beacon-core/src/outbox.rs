//! Latched broadcast.
//!
//! The channel has no acknowledgement, so "sending" means holding a value in
//! the slot for a fixed number of rounds. Messages queue behind the one being
//! held; when nothing is queued the role's idle message is broadcast.

use std::collections::VecDeque;

use beacon_protocol::Message;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Latched {
    message: Message,
    remaining: u32,
}

#[derive(Debug, Clone)]
pub struct Outbox {
    idle: Message,
    active: Option<Latched>,
    pending: VecDeque<Message>,
    hold_rounds: u32,
    capacity: usize,
}

impl Outbox {
    pub fn new(hold_rounds: u32, capacity: usize) -> Self {
        assert!(hold_rounds > 0, "hold_rounds must be > 0");
        Self {
            idle: Message::Empty,
            active: None,
            pending: VecDeque::new(),
            hold_rounds,
            capacity,
        }
    }

    pub fn hold_rounds(&self) -> u32 {
        self.hold_rounds
    }

    pub fn idle_message(&self) -> Message {
        self.idle
    }

    pub fn set_idle(&mut self, message: Message) {
        self.idle = message;
    }

    /// Queues `message` behind everything already latched.
    ///
    /// Returns `false` when the queue is full; the caller should retry later.
    /// A message that is already active or queued is not queued twice.
    pub fn latch(&mut self, message: Message) -> bool {
        if self.holds(&message) {
            return true;
        }
        if self.pending.len() >= self.capacity {
            debug!(?message, capacity = self.capacity, "outbox full, message not latched");
            return false;
        }
        self.pending.push_back(message);
        true
    }

    /// Queues `message` ahead of every pending message. The active message
    /// keeps its remaining rounds.
    ///
    /// Never refuses and never drops a queued message, so the queue may run
    /// one past capacity until the front is sent.
    pub fn latch_next(&mut self, message: Message) {
        if let Some(index) = self.pending.iter().position(|queued| *queued == message) {
            self.pending.remove(index);
        }
        if self.active.map(|latched| latched.message) == Some(message) {
            return;
        }
        self.pending.push_front(message);
        if self.pending.len() > self.capacity {
            debug!(?message, pending = self.pending.len(), "outbox over capacity");
        }
    }

    pub fn holds(&self, message: &Message) -> bool {
        self.active.map(|latched| latched.message) == Some(*message)
            || self.pending.contains(message)
    }

    /// True when the next rounds would only broadcast the idle message.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Message to broadcast this round. Call exactly once per round.
    pub fn next_round(&mut self) -> Message {
        if self.active.is_none() {
            self.active = self.pending.pop_front().map(|message| Latched {
                message,
                remaining: self.hold_rounds,
            });
        }

        match self.active.as_mut() {
            Some(latched) => {
                let message = latched.message;
                latched.remaining -= 1;
                if latched.remaining == 0 {
                    self.active = None;
                }
                message
            }
            None => self.idle,
        }
    }
}
