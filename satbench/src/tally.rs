//! Solved/total counters for a single group and for the whole run.

use crate::solver::Outcome;

/// Running count of attempted and solved instances.
///
/// Only [`Tally::record`] and [`Tally::absorb`] mutate a tally, so
/// `solved <= total` holds at every point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    solved: usize,
    total: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempted instance. Timeouts never count as solved.
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        if outcome.is_solved() {
            self.solved += 1;
        }
    }

    /// Add another tally (typically a finished group) into this one.
    pub fn absorb(&mut self, other: &Tally) {
        self.solved += other.solved;
        self.total += other.total;
    }

    pub fn solved(&self) -> usize {
        self.solved
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn unsolved(&self) -> usize {
        self.total - self.solved
    }
}
