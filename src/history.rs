//! Bounded claim history.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use crate::claim::Claim;
use crate::game::state::Actor;

/// A single history line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A claim made by an actor.
    Claim {
        /// Who made the claim.
        actor: Actor,
        /// The declared value.
        claim: Claim,
        /// Whether the claim was justified by the actor's roll.
        truthful: bool,
    },
    /// A narrative event such as a bluff call or a Social reset.
    Event(String),
}

/// Ring buffer of the most recent history entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl ClaimHistory {
    /// Creates an empty history keeping at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Appends a narrative event.
    pub fn push_event(&mut self, text: impl Into<String>) {
        self.push(HistoryEntry::Event(text.into()));
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Copies the entries from oldest to newest.
    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
