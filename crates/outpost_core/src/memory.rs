//! Bounded memory of the attacker's recent targets.
//!
//! The heuristic reads this to make the attacker press on places it just hit
//! and to steer the defender's suggestions elsewhere.

use std::collections::VecDeque;

use crate::outpost::OutpostId;

/// Number of recent targets remembered.
pub const MAX_AI_MEMORY: usize = 3;

/// FIFO of recently targeted outposts. Oldest entries are evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackMemory {
    recent: VecDeque<OutpostId>,
    capacity: usize,
}

impl AttackMemory {
    /// Create an empty memory with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_AI_MEMORY)
    }

    /// Create an empty memory holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a target, evicting the oldest entry on overflow.
    ///
    /// Repeat targets are appended again, so an outpost hit twice in a row
    /// occupies two slots.
    pub fn record(&mut self, target: OutpostId) {
        if self.capacity == 0 {
            return;
        }
        self.recent.push_back(target);
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    /// Whether the outpost is among the recent targets.
    #[must_use]
    pub fn contains(&self, target: OutpostId) -> bool {
        self.recent.contains(&target)
    }

    /// Most recently recorded target.
    #[must_use]
    pub fn most_recent(&self) -> Option<OutpostId> {
        self.recent.back().copied()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = OutpostId> + '_ {
        self.recent.iter().copied()
    }

    /// Number of remembered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.recent.clear();
    }
}

impl Default for AttackMemory {
    fn default() -> Self {
        Self::new()
    }
}
