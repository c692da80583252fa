use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Models the unreliability of a datagram link.
pub trait Loss: Send + Sync {
    /// Returns `true` if the current datagram should be discarded.
    fn should_drop(&self) -> bool;
}

/// A constant drop decision: `true` drops every datagram.
impl Loss for bool {
    fn should_drop(&self) -> bool {
        *self
    }
}

/// Adapter that lets a closure act as a [`Loss`] policy.
pub struct LossFn<F>(pub F);

impl<F> Loss for LossFn<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn should_drop(&self) -> bool {
        (self.0)()
    }
}

/// Drops each datagram independently with probability `rate` (0.0 to 1.0).
#[derive(Debug, Clone, Copy)]
pub struct RandomLoss {
    rate: f64,
}

impl RandomLoss {
    /// Creates a Bernoulli loss policy with the given drop probability.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Loss for RandomLoss {
    fn should_drop(&self) -> bool {
        rand::random::<f64>() < self.rate
    }
}

/// A thread-safe, mutable [`Loss`] provider sampling the [`RandomLoss`]
/// distribution. For other distributions, implement [`Loss`] directly.
///
/// Clones share the same underlying cell, so a handle kept by the
/// reconfiguration thread controls the rate the link observes.
#[derive(Debug, Clone, Default)]
pub struct LossVar {
    // The f64 rate is stored as its raw bits so the hot-path read stays a
    // single atomic load.
    rate_bits: Arc<AtomicU64>,
}

impl LossVar {
    /// Creates a variable with the given initial drop probability.
    pub fn new(rate: f64) -> Self {
        let var = Self::default();
        var.set(rate);
        var
    }

    /// Updates the drop probability. Takes effect for the next datagram.
    pub fn set(&self, rate: f64) {
        self.rate_bits.store(rate.to_bits(), Ordering::Relaxed);
    }

    fn rate(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::Relaxed))
    }
}

impl Loss for LossVar {
    fn should_drop(&self) -> bool {
        rand::random::<f64>() < self.rate()
    }
}
