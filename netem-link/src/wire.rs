//! The virtual-wire model: serialization and propagation delay.

use std::{net::SocketAddr, time::Duration};

use netem_policy::{Bandwidth, Jitter, Latency};

use crate::constants::{IPV4_HEADER_SIZE, IPV6_HEADER_SIZE};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Returns the L3 header estimate for an endpoint bound to `local`.
///
/// Sender-side overhead accounting is approximate, not bit-exact: endpoints
/// without a resolvable address (in-memory pipes, exotic transports) get the
/// IPv6 estimate.
pub fn header_size(local: Option<SocketAddr>) -> usize {
    match local {
        Some(addr) if addr.is_ipv4() => IPV4_HEADER_SIZE,
        _ => IPV6_HEADER_SIZE,
    }
}

/// Time to clock `size` payload bytes plus `header_size` overhead onto the
/// wire at the current bandwidth limit.
///
/// Zero when no limit is configured or the limit itself is zero (infinite
/// capacity).
pub fn transmission_time(
    bandwidth: Option<&dyn Bandwidth>,
    size: usize,
    header_size: usize,
) -> Duration {
    let bps = bandwidth.map_or(0, |bandwidth| bandwidth.limit());
    if bps == 0 {
        return Duration::ZERO;
    }

    let bits = (size + header_size) as u128 * 8;
    Duration::from_nanos((bits * NANOS_PER_SEC / bps as u128) as u64)
}

/// Simulated travel time through the link: the base latency plus the signed
/// jitter deviation, floored at zero.
///
/// Both policies are sampled exactly once per call.
pub fn propagation_delay(latency: Option<&dyn Latency>, jitter: Option<&dyn Jitter>) -> Duration {
    let base = latency.map_or(Duration::ZERO, |latency| latency.duration());
    let deviation = jitter.map_or(0, |jitter| jitter.deviation_ns());

    let total = base.as_nanos() as i128 + deviation as i128;
    if total > 0 {
        Duration::from_nanos(total as u64)
    } else {
        Duration::ZERO
    }
}
