//! Contracts the engines consume from wrapped endpoints.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use tokio::{
    io::DuplexStream,
    net::{TcpStream, UdpSocket},
};

/// Endpoints that can report the addresses of their underlying socket.
///
/// The local address drives the link's header-size estimate. Endpoints
/// without one (in-memory pipes) report [`io::ErrorKind::AddrNotAvailable`]
/// and get the IPv6 default.
pub trait Addressed {
    /// The local address the endpoint is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// The remote address the endpoint is connected to, if any.
    fn peer_addr(&self) -> io::Result<SocketAddr>;
}

impl Addressed for TcpStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }
}

impl Addressed for UdpSocket {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::peer_addr(self)
    }
}

impl Addressed for DuplexStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        Err(io::ErrorKind::AddrNotAvailable.into())
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        Err(io::ErrorKind::AddrNotAvailable.into())
    }
}

/// A connectionless datagram endpoint (UDP or a lookalike).
///
/// Implementations must tolerate concurrent calls from the caller task (the
/// shutdown-race passthrough) and the driver task.
#[async_trait]
pub trait DatagramEndpoint: Addressed + Send + Sync + 'static {
    /// Sends a datagram to `target`, returning the number of bytes sent.
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Receives a datagram, returning its length and source address.
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

#[async_trait]
impl DatagramEndpoint for UdpSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}
