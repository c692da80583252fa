use std::sync::atomic::{AtomicUsize, Ordering};

/// Emission counters for one emulated link.
/// These are shared between the driver task and the conn.
#[derive(Debug, Default)]
pub struct LinkStats {
    /// Total payload bytes emitted to the wrapped endpoint.
    bytes_tx: AtomicUsize,
    /// Total units (stream chunks or datagrams) emitted.
    units_tx: AtomicUsize,
    /// Datagrams discarded by the loss policy.
    dropped: AtomicUsize,
    /// Fault-induced closes.
    faults: AtomicUsize,
}

impl LinkStats {
    #[inline]
    pub(crate) fn increment_tx(&self, bytes: usize) {
        self.bytes_tx.fetch_add(bytes, Ordering::Relaxed);
        self.units_tx.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_faults(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn bytes_tx(&self) -> usize {
        self.bytes_tx.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn units_tx(&self) -> usize {
        self.units_tx.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn faults(&self) -> usize {
        self.faults.load(Ordering::Relaxed)
    }
}
