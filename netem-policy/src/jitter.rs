use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use rand::Rng;

/// Models the per-operation variance in transmission delay.
pub trait Jitter: Send + Sync {
    /// Returns the signed deviation from the base latency, in nanoseconds.
    ///
    /// Negative deviations may cancel part or all of the base latency; the
    /// combined propagation delay is floored at zero by the link.
    fn deviation_ns(&self) -> i64;
}

/// A constant, always-positive deviation.
impl Jitter for Duration {
    fn deviation_ns(&self) -> i64 {
        self.as_nanos() as i64
    }
}

/// Adapter that lets a closure act as a [`Jitter`] policy.
pub struct JitterFn<F>(pub F);

impl<F> Jitter for JitterFn<F>
where
    F: Fn() -> i64 + Send + Sync,
{
    fn deviation_ns(&self) -> i64 {
        (self.0)()
    }
}

fn sample(amplitude_ns: i64) -> i64 {
    if amplitude_ns <= 0 {
        return 0;
    }
    rand::thread_rng().gen_range(-amplitude_ns..=amplitude_ns)
}

/// Selects a deviation uniformly distributed in `[-amplitude, +amplitude]`
/// on every operation.
///
/// For example, `RandomJitter::new(Duration::from_millis(10))` yields a
/// deviation between -10ms and +10ms per scheduled write.
#[derive(Debug, Clone, Copy)]
pub struct RandomJitter {
    amplitude_ns: i64,
}

impl RandomJitter {
    /// Creates a jitter policy with the given amplitude.
    pub fn new(amplitude: Duration) -> Self {
        Self { amplitude_ns: amplitude.as_nanos() as i64 }
    }
}

impl Jitter for RandomJitter {
    fn deviation_ns(&self) -> i64 {
        sample(self.amplitude_ns)
    }
}

/// A thread-safe, mutable [`Jitter`] provider sampling the [`RandomJitter`]
/// distribution. For other distributions, implement [`Jitter`] directly.
///
/// Clones share the same underlying cell, so a handle kept by the
/// reconfiguration thread controls the amplitude the link observes.
#[derive(Debug, Clone, Default)]
pub struct JitterVar {
    amplitude_ns: Arc<AtomicU64>,
}

impl JitterVar {
    /// Creates a variable with the given initial amplitude.
    pub fn new(amplitude: Duration) -> Self {
        let var = Self::default();
        var.set(amplitude);
        var
    }

    /// Updates the amplitude. Takes effect for the next operation.
    pub fn set(&self, amplitude: Duration) {
        self.amplitude_ns.store(amplitude.as_nanos() as u64, Ordering::Relaxed);
    }
}

impl Jitter for JitterVar {
    fn deviation_ns(&self) -> i64 {
        sample(self.amplitude_ns.load(Ordering::Relaxed) as i64)
    }
}
