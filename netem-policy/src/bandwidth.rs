use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Models the capacity of the link.
pub trait Bandwidth: Send + Sync {
    /// Returns the allowed throughput in bits per second.
    ///
    /// Zero means the link has infinite capacity.
    fn limit(&self) -> u64;
}

/// A constant throughput in bits per second.
impl Bandwidth for u64 {
    fn limit(&self) -> u64 {
        *self
    }
}

/// Adapter that lets a closure act as a [`Bandwidth`] policy.
pub struct BandwidthFn<F>(pub F);

impl<F> Bandwidth for BandwidthFn<F>
where
    F: Fn() -> u64 + Send + Sync,
{
    fn limit(&self) -> u64 {
        (self.0)()
    }
}

/// A thread-safe, mutable [`Bandwidth`] provider.
///
/// Clones share the same underlying cell, so a handle kept by the
/// reconfiguration thread controls the value the link observes.
#[derive(Debug, Clone, Default)]
pub struct BandwidthVar {
    bps: Arc<AtomicU64>,
}

impl BandwidthVar {
    /// Creates a variable with the given initial limit in bits per second.
    pub fn new(bps: u64) -> Self {
        let var = Self::default();
        var.set(bps);
        var
    }

    /// Updates the bandwidth limit. Takes effect for the next operation.
    pub fn set(&self, bps: u64) {
        self.bps.store(bps, Ordering::Relaxed);
    }
}

impl Bandwidth for BandwidthVar {
    fn limit(&self) -> u64 {
        self.bps.load(Ordering::Relaxed)
    }
}
