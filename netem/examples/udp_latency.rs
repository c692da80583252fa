//! Sends a datagram through an emulated 150ms ± 20ms link and prints how
//! long it took to arrive.

use std::time::{Duration, Instant};

use netem::{policy::RandomJitter, PacketConn, PacketProfile};
use tokio::net::UdpSocket;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let receiver = UdpSocket::bind("127.0.0.1:0").await?;
    let peer = receiver.local_addr()?;

    let sender = PacketConn::new(
        UdpSocket::bind("127.0.0.1:0").await?,
        PacketProfile::new()
            .latency(Duration::from_millis(150))
            .jitter(RandomJitter::new(Duration::from_millis(20))),
    );

    let start = Instant::now();
    sender.send_to(b"probe", peer).await?;
    println!("send_to returned after {:?}", start.elapsed());

    let mut buf = [0u8; 32];
    let (n, from) = receiver.recv_from(&mut buf).await?;
    println!(
        "received {:?} from {from} after {:?}",
        std::str::from_utf8(&buf[..n])?,
        start.elapsed()
    );

    sender.close().await?;
    Ok(())
}
