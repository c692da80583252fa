//! Atomically replaceable wall-clock deadlines.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::time::Instant;

/// An optional deadline, replaceable from any thread. Absent means "no
/// deadline".
///
/// Deadlines are consulted on entry to an operation; they do not interrupt
/// work already in flight.
#[derive(Debug, Default)]
pub(crate) struct Deadline {
    at: ArcSwapOption<Instant>,
}

impl Deadline {
    /// Replaces the deadline. `None` clears it.
    pub(crate) fn set(&self, deadline: Option<Instant>) {
        self.at.store(deadline.map(Arc::new));
    }

    /// Returns the current deadline, if one is set.
    pub(crate) fn get(&self) -> Option<Instant> {
        self.at.load_full().map(|at| *at)
    }

    /// Whether a configured deadline is already in the past.
    pub(crate) fn passed(&self) -> bool {
        self.get().is_some_and(|at| at < Instant::now())
    }
}
