//! Bounded roll history.

use std::collections::VecDeque;

use bevy::prelude::*;

/// Past outcomes, most recent first, capped. Oldest entries are dropped
/// silently when the cap is exceeded.
#[derive(Resource)]
pub struct RollHistory {
    rolls: VecDeque<u32>,
    cap: usize,
}

impl Default for RollHistory {
    fn default() -> Self {
        Self::with_cap(10)
    }
}

impl RollHistory {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            rolls: VecDeque::new(),
            cap,
        }
    }

    pub fn record(&mut self, face: u32) {
        self.rolls.push_front(face);
        self.rolls.truncate(self.cap);
    }

    pub fn clear(&mut self) {
        self.rolls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    pub fn latest(&self) -> Option<u32> {
        self.rolls.front().copied()
    }

    /// Most recent first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.rolls.iter().copied()
    }
}
