use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Models the base propagation delay of a link.
pub trait Latency: Send + Sync {
    /// Returns the delay for the current operation.
    fn duration(&self) -> Duration;
}

/// A constant delay.
impl Latency for Duration {
    fn duration(&self) -> Duration {
        *self
    }
}

/// Adapter that lets a closure act as a [`Latency`] policy.
pub struct LatencyFn<F>(pub F);

impl<F> Latency for LatencyFn<F>
where
    F: Fn() -> Duration + Send + Sync,
{
    fn duration(&self) -> Duration {
        (self.0)()
    }
}

/// A thread-safe, mutable [`Latency`] provider.
///
/// Clones share the same underlying cell, so a handle kept by the
/// reconfiguration thread controls the value the link observes.
#[derive(Debug, Clone, Default)]
pub struct LatencyVar {
    nanos: Arc<AtomicU64>,
}

impl LatencyVar {
    /// Creates a variable with the given initial delay.
    pub fn new(latency: Duration) -> Self {
        let var = Self::default();
        var.set(latency);
        var
    }

    /// Updates the delay. Takes effect for the next scheduled operation.
    pub fn set(&self, latency: Duration) {
        self.nanos.store(latency.as_nanos() as u64, Ordering::Relaxed);
    }
}

impl Latency for LatencyVar {
    fn duration(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}
