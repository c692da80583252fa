use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Models the stability of a connection.
pub trait Fault: Send + Sync {
    /// Returns `true` if the connection should be severed abruptly.
    fn should_close(&self) -> bool;
}

/// A constant decision: `true` severs the connection on the first write.
impl Fault for bool {
    fn should_close(&self) -> bool {
        *self
    }
}

/// Adapter that lets a closure act as a [`Fault`] policy.
pub struct FaultFn<F>(pub F);

impl<F> Fault for FaultFn<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn should_close(&self) -> bool {
        (self.0)()
    }
}

/// Severs the connection on each write independently with probability
/// `rate` (0.0 to 1.0).
#[derive(Debug, Clone, Copy)]
pub struct RandomFault {
    rate: f64,
}

impl RandomFault {
    /// Creates a Bernoulli fault policy with the given close probability.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Fault for RandomFault {
    fn should_close(&self) -> bool {
        rand::random::<f64>() < self.rate
    }
}

/// A thread-safe, mutable [`Fault`] provider sampling the [`RandomFault`]
/// distribution. For other distributions, implement [`Fault`] directly.
///
/// Clones share the same underlying cell, so a handle kept by the
/// reconfiguration thread controls the rate the link observes.
#[derive(Debug, Clone, Default)]
pub struct FaultVar {
    // The f64 rate is stored as its raw bits so the hot-path read stays a
    // single atomic load.
    rate_bits: Arc<AtomicU64>,
}

impl FaultVar {
    /// Creates a variable with the given initial close probability.
    pub fn new(rate: f64) -> Self {
        let var = Self::default();
        var.set(rate);
        var
    }

    /// Updates the close probability. Takes effect for the next write.
    pub fn set(&self, rate: f64) {
        self.rate_bits.store(rate.to_bits(), Ordering::Relaxed);
    }

    fn rate(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::Relaxed))
    }
}

impl Fault for FaultVar {
    fn should_close(&self) -> bool {
        rand::random::<f64>() < self.rate()
    }
}
