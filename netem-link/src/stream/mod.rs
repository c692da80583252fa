//! FIFO-preserving egress engine for stream endpoints.

mod conn;
mod driver;

pub use conn::StreamConn;

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use netem_policy::Bandwidth;
use tokio::time::Instant;

use crate::wire;

/// A scheduled chunk: an owned copy of the bytes and the instant they are
/// due on the wire.
#[derive(Debug)]
pub(crate) struct WriteRequest {
    pub(crate) data: Bytes,
    pub(crate) due: Instant,
}

/// The virtual wire modelled as a single serial server.
///
/// Reservations are chained: a chunk starts serializing only when its
/// predecessor finishes, so `next_free` never moves backwards and a later
/// chunk can never complete before an earlier one.
pub(crate) struct WireClock {
    bandwidth: Option<Arc<dyn Bandwidth>>,
    header_size: usize,
    next_free: Mutex<Instant>,
}

impl WireClock {
    pub(crate) fn new(bandwidth: Option<Arc<dyn Bandwidth>>, header_size: usize) -> Self {
        Self { bandwidth, header_size, next_free: Mutex::new(Instant::now()) }
    }

    /// Reserves the wire for a `size`-byte chunk and returns the instant
    /// its serialization completes.
    ///
    /// An idle wire starts serializing immediately; a busy wire queues the
    /// chunk behind the current transmission.
    pub(crate) fn reserve(&self, size: usize) -> Instant {
        let mut next_free = self.next_free.lock().expect("wire clock lock poisoned");

        let now = Instant::now();
        let start = if *next_free > now { *next_free } else { now };
        let finish =
            start + wire::transmission_time(self.bandwidth.as_deref(), size, self.header_size);

        *next_free = finish;
        finish
    }
}
