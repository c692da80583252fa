//! Construction-time link profiles.

use std::sync::Arc;

use netem_policy::{Bandwidth, Fault, Jitter, Latency, Loss};

use crate::constants::{DEFAULT_QUEUE_CAPACITY, ETHERNET_DEFAULT_MTU};

/// Impairment profile for reliable, ordered stream links.
///
/// Stream links carry a [`Fault`] policy but no loss policy: a reliable
/// transport masks datagram loss, so drop semantics are unobservable at
/// this layer.
#[derive(Clone, Default)]
pub struct StreamProfile {
    pub(crate) mtu: Option<usize>,
    pub(crate) queue_capacity: Option<usize>,
    pub(crate) latency: Option<Arc<dyn Latency>>,
    pub(crate) jitter: Option<Arc<dyn Jitter>>,
    pub(crate) bandwidth: Option<Arc<dyn Bandwidth>>,
    pub(crate) fault: Option<Arc<dyn Fault>>,
}

impl StreamProfile {
    /// Creates a profile with no impairments and default sizing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest packet size allowed on the link, L3/L4 headers included.
    /// Defaults to [`ETHERNET_DEFAULT_MTU`].
    pub fn mtu(mut self, mtu: usize) -> Self {
        self.mtu = Some(mtu);
        self
    }

    /// Capacity of the write queue, in requests. Defaults to
    /// [`DEFAULT_QUEUE_CAPACITY`].
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Base propagation delay, re-sampled per chunk.
    pub fn latency<L: Latency + 'static>(mut self, latency: L) -> Self {
        self.latency = Some(Arc::new(latency));
        self
    }

    /// Signed delay variance, re-sampled per chunk.
    pub fn jitter<J: Jitter + 'static>(mut self, jitter: J) -> Self {
        self.jitter = Some(Arc::new(jitter));
        self
    }

    /// Serialization rate limit in bits per second.
    pub fn bandwidth<B: Bandwidth + 'static>(mut self, bandwidth: B) -> Self {
        self.bandwidth = Some(Arc::new(bandwidth));
        self
    }

    /// Abrupt-close policy, consulted per queued chunk.
    pub fn fault<F: Fault + 'static>(mut self, fault: F) -> Self {
        self.fault = Some(Arc::new(fault));
        self
    }

    pub(crate) fn mtu_or_default(&self) -> usize {
        self.mtu.unwrap_or(ETHERNET_DEFAULT_MTU)
    }

    pub(crate) fn queue_capacity_or_default(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Impairment profile for datagram links.
///
/// Datagram links carry a [`Loss`] policy but no fault policy: an
/// unreliable socket has no connection to sever.
#[derive(Clone, Default)]
pub struct PacketProfile {
    pub(crate) mtu: Option<usize>,
    pub(crate) queue_capacity: Option<usize>,
    pub(crate) latency: Option<Arc<dyn Latency>>,
    pub(crate) jitter: Option<Arc<dyn Jitter>>,
    pub(crate) bandwidth: Option<Arc<dyn Bandwidth>>,
    pub(crate) loss: Option<Arc<dyn Loss>>,
}

impl PacketProfile {
    /// Creates a profile with no impairments and default sizing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest packet size allowed on the link, L3/L4 headers included.
    /// Defaults to [`ETHERNET_DEFAULT_MTU`]. Oversize payloads are rejected
    /// at `send_to`.
    pub fn mtu(mut self, mtu: usize) -> Self {
        self.mtu = Some(mtu);
        self
    }

    /// Capacity of the write queue, in requests. Defaults to
    /// [`DEFAULT_QUEUE_CAPACITY`].
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Base propagation delay, re-sampled per datagram.
    pub fn latency<L: Latency + 'static>(mut self, latency: L) -> Self {
        self.latency = Some(Arc::new(latency));
        self
    }

    /// Signed delay variance, re-sampled per datagram. Enough jitter
    /// reorders delivery.
    pub fn jitter<J: Jitter + 'static>(mut self, jitter: J) -> Self {
        self.jitter = Some(Arc::new(jitter));
        self
    }

    /// Serialization rate limit in bits per second.
    pub fn bandwidth<B: Bandwidth + 'static>(mut self, bandwidth: B) -> Self {
        self.bandwidth = Some(Arc::new(bandwidth));
        self
    }

    /// Drop policy, consulted per datagram at emission time.
    pub fn loss<L: Loss + 'static>(mut self, loss: L) -> Self {
        self.loss = Some(Arc::new(loss));
        self
    }

    pub(crate) fn mtu_or_default(&self) -> usize {
        self.mtu.unwrap_or(ETHERNET_DEFAULT_MTU)
    }

    pub(crate) fn queue_capacity_or_default(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }
}
