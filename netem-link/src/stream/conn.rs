use std::{
    io,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use netem_policy::{Jitter, Latency};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf},
    sync::{mpsc, Mutex},
    time::Instant,
};
use tracing::Instrument;

use super::{driver::StreamDriver, WireClock, WriteRequest};
use crate::{
    deadline::Deadline, endpoint::Addressed, profile::StreamProfile, shutdown::Shutdown,
    stats::LinkStats, wire, LinkError,
};

/// State shared between a [`StreamConn`] and its driver: the write half of
/// the endpoint plus everything either side needs to sever the link.
pub(crate) struct StreamState<Io> {
    pub(crate) writer: Mutex<WriteHalf<Io>>,
    pub(crate) shutdown: Shutdown,
    closed: AtomicBool,
    pub(crate) stats: LinkStats,
}

impl<Io: AsyncWrite + Send + 'static> StreamState<Io> {
    /// Severs the link: flips the shutdown flag, then shuts the write half
    /// down. Only the first caller performs the endpoint teardown; repeat
    /// calls return `Ok(())`.
    pub(crate) async fn sever(&self) -> io::Result<()> {
        self.shutdown.signal();
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.writer.lock().await.shutdown().await
    }
}

/// An emulated stream link wrapping a reliable, ordered endpoint.
///
/// Writes are chunked by MSS and each chunk reserves the virtual wire
/// serially, so emission order always equals submission order: jitter can
/// delay a chunk but can never let a later chunk overtake an earlier one.
/// Reads pass through to the wrapped endpoint untouched.
///
/// Dropping the conn stops its driver; queued chunks are discarded.
pub struct StreamConn<Io> {
    state: Arc<StreamState<Io>>,
    reader: Mutex<ReadHalf<Io>>,
    to_driver: mpsc::Sender<WriteRequest>,
    wire_clock: WireClock,
    latency: Option<Arc<dyn Latency>>,
    jitter: Option<Arc<dyn Jitter>>,
    mss: usize,
    local_addr: Option<SocketAddr>,
    peer_addr: Option<SocketAddr>,
    write_deadline: Deadline,
    read_deadline: Deadline,
}

impl<Io> StreamConn<Io>
where
    Io: AsyncRead + AsyncWrite + Addressed + Send + 'static,
{
    /// Wraps `io` in an emulated link and spawns its driver.
    ///
    /// The header estimate is derived from the endpoint's local address
    /// family and, together with the profile MTU, fixes the MSS.
    pub fn new(io: Io, profile: StreamProfile) -> Self {
        let local_addr = Addressed::local_addr(&io).ok();
        let peer_addr = Addressed::peer_addr(&io).ok();
        let header_size = wire::header_size(local_addr);
        // Floor at one byte so chunking always makes progress.
        let mss = profile.mtu_or_default().saturating_sub(header_size).max(1);

        let (reader, writer) = tokio::io::split(io);
        let (to_driver, from_conn) = mpsc::channel(profile.queue_capacity_or_default());

        let state = Arc::new(StreamState {
            writer: Mutex::new(writer),
            shutdown: Shutdown::new(),
            closed: AtomicBool::new(false),
            stats: LinkStats::default(),
        });

        let driver = StreamDriver {
            state: Arc::clone(&state),
            from_conn,
            fault: profile.fault.clone(),
        };
        let span = tracing::debug_span!("stream_driver", addr = ?local_addr);
        tokio::spawn(driver.run().instrument(span));

        Self {
            state,
            reader: Mutex::new(reader),
            to_driver,
            wire_clock: WireClock::new(profile.bandwidth.clone(), header_size),
            latency: profile.latency,
            jitter: profile.jitter,
            mss,
            local_addr,
            peer_addr,
            write_deadline: Deadline::default(),
            read_deadline: Deadline::default(),
        }
    }

    /// Writes `buf` through the emulated link, returning the number of
    /// bytes accepted.
    ///
    /// The buffer is segmented into MSS-sized chunks; each chunk reserves
    /// the virtual wire, gets a freshly sampled propagation delay, and is
    /// queued for emission at its due time with its own owned copy, so the
    /// caller may reuse `buf` the moment this returns. If the link shuts
    /// down mid-write, the remainder is flushed straight through the
    /// endpoint, trading timing fidelity for not losing data at teardown.
    pub async fn write(&self, buf: &[u8]) -> Result<usize, LinkError> {
        if self.write_deadline.passed() {
            return Err(LinkError::DeadlineExceeded);
        }

        let mut sent = 0;
        while sent < buf.len() {
            let chunk = &buf[sent..buf.len().min(sent + self.mss)];
            let finish = self.wire_clock.reserve(chunk.len());
            // Latency and jitter are re-sampled per chunk so dynamic
            // policies take effect mid-buffer.
            let due = finish
                + wire::propagation_delay(self.latency.as_deref(), self.jitter.as_deref());
            let request = WriteRequest { data: Bytes::copy_from_slice(chunk), due };

            tokio::select! {
                biased;
                _ = self.state.shutdown.signalled() => {
                    return self.flush_remainder(buf, sent).await;
                }
                queued = self.to_driver.send(request) => match queued {
                    Ok(()) => sent += chunk.len(),
                    Err(_) => return self.flush_remainder(buf, sent).await,
                },
            }
        }
        Ok(sent)
    }

    /// The link stopped mid-write; emission timing no longer matters, so
    /// push what is left directly through the endpoint.
    async fn flush_remainder(&self, buf: &[u8], sent: usize) -> Result<usize, LinkError> {
        let mut writer = self.state.writer.lock().await;
        writer.write_all(&buf[sent..]).await?;
        Ok(buf.len())
    }

    /// Reads from the wrapped endpoint. The receive path is not impaired;
    /// a configured read deadline bounds the wait.
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let deadline = self.read_deadline.get();
        let mut reader = self.reader.lock().await;
        match deadline {
            Some(at) => tokio::time::timeout_at(at, reader.read(buf))
                .await
                .map_err(|_| io::Error::from(io::ErrorKind::TimedOut))?,
            None => reader.read(buf).await,
        }
    }

    /// Closes the emulated link.
    ///
    /// The first call signals the driver (queued chunks are discarded),
    /// shuts down the write half of the endpoint and returns its result;
    /// repeat calls return `Ok(())`. Writers racing the close flush their
    /// remaining bytes directly.
    pub async fn close(&self) -> io::Result<()> {
        self.state.sever().await
    }

    /// Sets both the read and the write deadline. `None` clears them.
    pub fn set_deadline(&self, deadline: Option<Instant>) {
        self.set_read_deadline(deadline);
        self.set_write_deadline(deadline);
    }

    /// Sets the write deadline, consulted on entry to each
    /// [`write`](Self::write). `None` clears it.
    pub fn set_write_deadline(&self, deadline: Option<Instant>) {
        self.write_deadline.set(deadline);
    }

    /// Sets the read deadline enforced by [`read`](Self::read). `None`
    /// clears it.
    pub fn set_read_deadline(&self, deadline: Option<Instant>) {
        self.read_deadline.set(deadline);
    }

    /// Local address of the wrapped endpoint, when it has one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Remote address of the wrapped endpoint, when it has one.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Maximum segment size of the link: MTU minus the header estimate.
    pub fn mss(&self) -> usize {
        self.mss
    }

    /// Emission counters for this link.
    pub fn stats(&self) -> &LinkStats {
        &self.state.stats
    }
}

impl<Io> Drop for StreamConn<Io> {
    fn drop(&mut self) {
        // The driver exits on the signal; queued requests are discarded.
        self.state.shutdown.signal();
    }
}
