#![cfg_attr(not(test), warn(unused_crate_dependencies))]

//! Network emulation wrappers for stream and datagram endpoints.
//!
//! `netem` imposes configurable, dynamically mutable link impairments
//! (bandwidth throttling, propagation latency, jitter, datagram loss, and
//! abrupt connection faults) on the data an endpoint sends, without kernel
//! traffic control or modified transports. Reads pass through untouched.
//!
//! Wrap a reliable stream in a [`StreamConn`] (FIFO byte ordering is
//! preserved) or a datagram socket in a [`PacketConn`] (datagrams are
//! emitted in due order, so jitter reorders them). Impairments come from
//! the [`policy`] module; every policy is sampled per operation, and the
//! `*Var` forms can be re-pointed mid-simulation from another thread.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use netem::{policy::RandomJitter, PacketConn, PacketProfile};
//! use tokio::net::UdpSocket;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let socket = UdpSocket::bind("127.0.0.1:0").await?;
//! let link = PacketConn::new(
//!     socket,
//!     PacketProfile::new()
//!         .latency(Duration::from_millis(40))
//!         .jitter(RandomJitter::new(Duration::from_millis(10)))
//!         .bandwidth(1_000_000u64),
//! );
//!
//! link.send_to(b"probe", "127.0.0.1:9000".parse()?).await?;
//! # Ok(())
//! # }
//! ```

pub use netem_link::*;
pub use netem_policy as policy;
