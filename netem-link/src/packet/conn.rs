use std::{io, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use netem_policy::{Bandwidth, Jitter, Latency};
use tokio::{sync::mpsc, time::Instant};
use tracing::Instrument;

use super::{driver::PacketDriver, PacketRequest};
use crate::{
    deadline::Deadline, endpoint::DatagramEndpoint, profile::PacketProfile, shutdown::Shutdown,
    stats::LinkStats, wire, LinkError,
};

/// An emulated datagram link wrapping a connectionless endpoint.
///
/// Unlike [`StreamConn`](crate::StreamConn) there is no wire reservation:
/// every datagram's due time is computed independently against the current
/// clock, so a later submission that draws a smaller jitter sample departs
/// first. That reordering is the point: preserving submission order here
/// would make jitter unobservable.
///
/// Dropping the conn stops its driver and releases the endpoint; pending
/// datagrams are discarded.
pub struct PacketConn<E> {
    endpoint: Arc<E>,
    to_driver: mpsc::Sender<PacketRequest>,
    shutdown: Shutdown,
    stats: Arc<LinkStats>,
    header_size: usize,
    mss: usize,
    latency: Option<Arc<dyn Latency>>,
    jitter: Option<Arc<dyn Jitter>>,
    bandwidth: Option<Arc<dyn Bandwidth>>,
    write_deadline: Deadline,
    read_deadline: Deadline,
}

impl<E: DatagramEndpoint> PacketConn<E> {
    /// Wraps `endpoint` in an emulated link and spawns its driver.
    pub fn new(endpoint: E, profile: PacketProfile) -> Self {
        let endpoint = Arc::new(endpoint);
        let local_addr = endpoint.local_addr().ok();
        let header_size = wire::header_size(local_addr);
        let mss = profile.mtu_or_default().saturating_sub(header_size).max(1);

        let (to_driver, from_conn) = mpsc::channel(profile.queue_capacity_or_default());
        let shutdown = Shutdown::new();
        let stats = Arc::new(LinkStats::default());

        let driver = PacketDriver {
            endpoint: Arc::clone(&endpoint),
            from_conn,
            loss: profile.loss.clone(),
            shutdown: shutdown.clone(),
            stats: Arc::clone(&stats),
        };
        let span = tracing::debug_span!("packet_driver", addr = ?local_addr);
        tokio::spawn(driver.run().instrument(span));

        Self {
            endpoint,
            to_driver,
            shutdown,
            stats,
            header_size,
            mss,
            latency: profile.latency,
            jitter: profile.jitter,
            bandwidth: profile.bandwidth,
            write_deadline: Deadline::default(),
            read_deadline: Deadline::default(),
        }
    }

    /// Schedules `buf` for emission to `target` and returns as soon as the
    /// payload is copied and queued; the caller may reuse `buf`
    /// immediately.
    ///
    /// Payloads larger than the link MSS are rejected with
    /// [`LinkError::PayloadTooLarge`]. After the link has stopped, the
    /// datagram is passed straight through the endpoint instead.
    pub async fn send_to(&self, buf: &[u8], target: SocketAddr) -> Result<usize, LinkError> {
        if self.write_deadline.passed() {
            return Err(LinkError::DeadlineExceeded);
        }
        if buf.len() > self.mss {
            return Err(LinkError::PayloadTooLarge { size: buf.len(), limit: self.mss });
        }

        let delay = wire::transmission_time(self.bandwidth.as_deref(), buf.len(), self.header_size)
            + wire::propagation_delay(self.latency.as_deref(), self.jitter.as_deref());
        let request = PacketRequest {
            data: Bytes::copy_from_slice(buf),
            target,
            due: Instant::now() + delay,
        };

        tokio::select! {
            biased;
            _ = self.shutdown.signalled() => {
                self.endpoint.send_to(buf, target).await?;
                Ok(buf.len())
            }
            queued = self.to_driver.send(request) => match queued {
                Ok(()) => Ok(buf.len()),
                Err(_) => {
                    self.endpoint.send_to(buf, target).await?;
                    Ok(buf.len())
                }
            },
        }
    }

    /// Receives a datagram from the wrapped endpoint. The receive path is
    /// not impaired; a configured read deadline bounds the wait.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        match self.read_deadline.get() {
            Some(at) => tokio::time::timeout_at(at, self.endpoint.recv_from(buf))
                .await
                .map_err(|_| io::Error::from(io::ErrorKind::TimedOut))?,
            None => self.endpoint.recv_from(buf).await,
        }
    }

    /// Stops the link's scheduler. Pending datagrams are discarded and
    /// later [`send_to`](Self::send_to) calls pass straight through; the
    /// socket itself is released when the conn drops. Repeat calls are
    /// no-ops.
    pub async fn close(&self) -> io::Result<()> {
        self.shutdown.signal();
        Ok(())
    }

    /// Sets both the read and the write deadline. `None` clears them.
    pub fn set_deadline(&self, deadline: Option<Instant>) {
        self.set_read_deadline(deadline);
        self.set_write_deadline(deadline);
    }

    /// Sets the write deadline, consulted on entry to each
    /// [`send_to`](Self::send_to). `None` clears it.
    pub fn set_write_deadline(&self, deadline: Option<Instant>) {
        self.write_deadline.set(deadline);
    }

    /// Sets the read deadline enforced by [`recv_from`](Self::recv_from).
    /// `None` clears it.
    pub fn set_read_deadline(&self, deadline: Option<Instant>) {
        self.read_deadline.set(deadline);
    }

    /// Local address of the wrapped endpoint.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.endpoint.local_addr()
    }

    /// Maximum segment size of the link: MTU minus the header estimate.
    pub fn mss(&self) -> usize {
        self.mss
    }

    /// Emission counters for this link.
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }
}

impl<E> Drop for PacketConn<E> {
    fn drop(&mut self) {
        // The driver exits on the signal; pending datagrams are discarded.
        self.shutdown.signal();
    }
}
