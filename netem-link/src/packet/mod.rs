//! Due-order egress engine for datagram endpoints.

mod conn;
mod driver;

pub use conn::PacketConn;

use std::{cmp::Ordering, net::SocketAddr};

use bytes::Bytes;
use tokio::time::Instant;

/// A scheduled datagram: an owned copy of the payload, its destination and
/// the instant it is due on the wire.
#[derive(Debug, Clone)]
pub(crate) struct PacketRequest {
    pub(crate) data: Bytes,
    pub(crate) target: SocketAddr,
    pub(crate) due: Instant,
}

// Ordered on `due` alone, reversed so a `BinaryHeap` pops the earliest
// departure first. Datagrams with equal due times pop in no particular
// order.
impl Ord for PacketRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due)
    }
}

impl PartialOrd for PacketRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PacketRequest {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due
    }
}

impl Eq for PacketRequest {}
