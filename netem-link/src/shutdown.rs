//! One-shot shutdown signalling shared by a link and its driver.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio_util::sync::CancellationToken;

/// A one-shot flag with two observable states: running and stopped.
///
/// The transition only goes running → stopped and is idempotent.
/// [`Shutdown::signal`] reports whether the caller performed it, so close
/// paths run their endpoint teardown exactly once.
#[derive(Debug, Clone, Default)]
pub(crate) struct Shutdown {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl Shutdown {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Flips the flag to stopped. Returns `true` if this call performed the
    /// transition, `false` if the flag was already stopped.
    pub(crate) fn signal(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::SeqCst);
        if first {
            self.token.cancel();
        }
        first
    }

    /// Whether the flag has flipped to stopped.
    pub(crate) fn is_signalled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the flag flips to stopped.
    pub(crate) async fn signalled(&self) {
        self.token.cancelled().await;
    }
}
