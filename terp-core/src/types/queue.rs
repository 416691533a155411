//! Moderation queue snapshot.

use serde::{Deserialize, Serialize};

/// Number of items awaiting verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCounts {
    /// Unverified professors
    pub professors: u64,
    /// Unverified reviews
    pub reviews: u64,
}

impl PendingCounts {
    /// Creates a snapshot from raw counts.
    pub fn new(professors: u64, reviews: u64) -> Self {
        Self { professors, reviews }
    }

    /// Total pending items.
    pub fn total(&self) -> u64 {
        self.professors.saturating_add(self.reviews)
    }

    /// True when nothing awaits verification.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
