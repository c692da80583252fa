use std::{collections::BinaryHeap, sync::Arc};

use netem_policy::Loss;
use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};

use super::PacketRequest;
use crate::{endpoint::DatagramEndpoint, shutdown::Shutdown, stats::LinkStats};

/// Single consumer of a packet link's write queue.
///
/// Pending datagrams live in a min-heap keyed on due time; a single timer
/// tracks the head. The heap, not submission order, decides emission order.
pub(crate) struct PacketDriver<E> {
    pub(crate) endpoint: Arc<E>,
    pub(crate) from_conn: mpsc::Receiver<PacketRequest>,
    pub(crate) loss: Option<Arc<dyn Loss>>,
    pub(crate) shutdown: Shutdown,
    pub(crate) stats: Arc<LinkStats>,
}

impl<E: DatagramEndpoint> PacketDriver<E> {
    pub(crate) async fn run(mut self) {
        let mut pending: BinaryHeap<PacketRequest> = BinaryHeap::new();
        let timer = sleep_until(Instant::now());
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.signalled() => {
                    tracing::debug!(discarded = pending.len(), "link stopped");
                    return;
                }
                _ = timer.as_mut(), if !pending.is_empty() => {
                    self.emit_due(&mut pending).await;
                    if let Some(head) = pending.peek() {
                        timer.as_mut().reset(head.due);
                    }
                }
                request = self.from_conn.recv() => {
                    let Some(request) = request else { return };
                    // Re-arm only when this request becomes the new head.
                    if pending.peek().map_or(true, |head| request.due < head.due) {
                        timer.as_mut().reset(request.due);
                    }
                    pending.push(request);
                }
            }
        }
    }

    /// Emits every pending datagram whose due time has arrived, consulting
    /// the loss policy once per datagram.
    async fn emit_due(&self, pending: &mut BinaryHeap<PacketRequest>) {
        let now = Instant::now();
        while let Some(head) = pending.peek() {
            if head.due > now {
                break;
            }
            let packet = pending.pop().expect("peeked head disappeared");

            if self.loss.as_ref().is_some_and(|loss| loss.should_drop()) {
                self.stats.increment_dropped();
                tracing::trace!(target_addr = %packet.target, "datagram dropped by loss policy");
                continue;
            }

            match self.endpoint.send_to(&packet.data, packet.target).await {
                Ok(_) => self.stats.increment_tx(packet.data.len()),
                // Best-effort emulation: the caller already received its
                // byte count, so emit errors are logged and swallowed.
                Err(err) => tracing::warn!(?err, "swallowing emit error"),
            }
        }
    }
}
