use std::sync::Arc;

use netem_policy::Fault;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    time::sleep_until,
};

use super::{conn::StreamState, WriteRequest};

/// Single consumer of a stream link's write queue.
///
/// Because there is exactly one driver and the queue is FIFO, byte order on
/// the wire matches submission order.
pub(crate) struct StreamDriver<Io> {
    pub(crate) state: Arc<StreamState<Io>>,
    pub(crate) from_conn: mpsc::Receiver<WriteRequest>,
    pub(crate) fault: Option<Arc<dyn Fault>>,
}

impl<Io: AsyncWrite + Send + 'static> StreamDriver<Io> {
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.state.shutdown.signalled() => {
                    tracing::debug!("link stopped, discarding queued writes");
                    return;
                }
                request = self.from_conn.recv() => {
                    let Some(request) = request else { return };
                    if !self.process(request).await {
                        return;
                    }
                }
            }
        }
    }

    /// Handles one queued chunk. Returns `false` once the link is severed.
    async fn process(&self, request: WriteRequest) -> bool {
        if self.fault.as_ref().is_some_and(|fault| fault.should_close()) {
            tracing::debug!("fault policy fired, severing the link");
            self.state.stats.increment_faults();
            if let Err(err) = self.state.sever().await {
                tracing::warn!(?err, "error closing endpoint after fault");
            }
            return false;
        }

        sleep_until(request.due).await;

        let mut writer = self.state.writer.lock().await;
        match writer.write_all(&request.data).await {
            Ok(()) => self.state.stats.increment_tx(request.data.len()),
            // Best-effort emulation: the caller already received its byte
            // count, so emit errors are logged and swallowed.
            Err(err) => tracing::warn!(?err, "swallowing emit error"),
        }
        true
    }
}
