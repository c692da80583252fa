//! Link-level constants shared by both engines.

/// Estimated L3 header size for IPv4 endpoints, in bytes.
pub const IPV4_HEADER_SIZE: usize = 20;

/// Estimated L3 header size for IPv6 endpoints, in bytes.
pub const IPV6_HEADER_SIZE: usize = 40;

/// Default MTU of an Ethernet link.
pub const ETHERNET_DEFAULT_MTU: usize = 1500;

/// MTU of an Ethernet link carrying jumbo frames.
pub const ETHERNET_JUMBO_FRAME_MTU: usize = 9000;

/// Largest MTU an IP datagram can describe.
pub const IP_MAXIMUM_MTU: usize = 65536;

/// Default capacity of the per-link write queue, in requests. Writers block
/// when the queue is full, until the driver drains it or the link stops.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
