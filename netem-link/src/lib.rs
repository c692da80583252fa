#![cfg_attr(not(test), warn(unused_crate_dependencies))]

//! Emulated network links for stream and datagram endpoints.
//!
//! This crate wraps existing transport endpoints to impose configurable,
//! dynamically mutable link impairments (bandwidth throttling, propagation
//! latency, jitter, datagram loss, and abrupt connection faults) on the
//! data they send. Reads pass through untouched.
//!
//! Two engines are provided, one per transport semantic:
//!
//! - [`StreamConn`] preserves FIFO byte ordering. Outgoing bytes are chunked
//!   by MSS and each chunk reserves the virtual wire *serially*, queueing
//!   behind the bytes before it. Jitter can delay a chunk but never lets a
//!   later chunk overtake an earlier one.
//! - [`PacketConn`] schedules every datagram independently and emits in due
//!   order, so a later datagram that draws a smaller jitter sample departs
//!   first, exactly the reordering real datagram links exhibit.
//!
//! Each emulated link runs one driver task that consumes scheduled write
//! requests from a bounded queue and emits them to the wrapped endpoint at
//! their due time. Scheduling is best effort against the host clock, not
//! hard real time.
//!
//! Impairments are [`netem_policy`] trait objects, sampled once per
//! operation; install a `*Var` policy to reconfigure a link mid-simulation.

use std::io;

use thiserror::Error;

pub mod constants;
mod deadline;
mod endpoint;
mod packet;
mod profile;
mod shutdown;
mod stats;
mod stream;
pub mod wire;

pub use endpoint::{Addressed, DatagramEndpoint};
pub use packet::PacketConn;
pub use profile::{PacketProfile, StreamProfile};
pub use stats::LinkStats;
pub use stream::StreamConn;

/// Errors returned by the write-side entry points of an emulated link.
///
/// Impairments themselves are silent: loss drops, fault-induced closes and
/// emission errors on the driver path are not reported to a caller that has
/// already handed its bytes over.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The configured write deadline was already in the past on entry.
    #[error("write deadline exceeded")]
    DeadlineExceeded,

    /// The datagram payload does not fit the link's segment limit.
    #[error("payload of {size} bytes exceeds the segment limit of {limit}")]
    PayloadTooLarge {
        /// Size of the rejected payload.
        size: usize,
        /// Largest payload the link accepts (MTU minus header estimate).
        limit: usize,
    },

    /// An error surfaced verbatim from the wrapped endpoint.
    #[error("endpoint error: {0}")]
    Endpoint(#[from] io::Error),
}
