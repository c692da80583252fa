use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use netem_link::{LinkError, PacketConn, PacketProfile};
use netem_policy::{Jitter, LossVar, RandomLoss};
use tokio::{
    net::UdpSocket,
    time::{timeout, Instant},
};

async fn local_udp() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.expect("bind loopback udp")
}

#[tokio::test]
async fn latency_delays_delivery() {
    let _ = tracing_subscriber::fmt::try_init();
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    let sender = PacketConn::new(
        local_udp().await,
        PacketProfile::new().latency(Duration::from_millis(50)),
    );

    let mut payload = *b"hello-world";
    let start = Instant::now();
    let n = sender.send_to(&payload, peer).await.unwrap();
    assert_eq!(n, payload.len());
    assert!(start.elapsed() < Duration::from_millis(50), "send_to should not block");

    // The scheduled copy is owned; clobbering the source buffer must not
    // affect what arrives.
    payload.fill(b'#');

    let mut buf = [0u8; 64];
    let (n, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
        .await
        .expect("datagram never arrived")
        .unwrap();

    assert_eq!(&buf[..n], b"hello-world");
    assert!(start.elapsed() >= Duration::from_millis(50), "arrived too fast");
}

/// Alternates +50ms and -50ms so the second datagram overtakes the first.
#[derive(Default)]
struct AlternatingJitter {
    calls: AtomicU32,
}

impl Jitter for AlternatingJitter {
    fn deviation_ns(&self) -> i64 {
        const STEP_NS: i64 = 50_000_000;
        if self.calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
            STEP_NS
        } else {
            -STEP_NS
        }
    }
}

#[tokio::test]
async fn jitter_reorders_delivery() {
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    let sender = PacketConn::new(
        local_udp().await,
        PacketProfile::new()
            .latency(Duration::from_millis(100))
            .jitter(AlternatingJitter::default()),
    );

    // A is due at ~150ms, B at ~50ms.
    sender.send_to(b"Packet A", peer).await.unwrap();
    sender.send_to(b"Packet B", peer).await.unwrap();

    let mut buf = [0u8; 64];
    let (n, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
        .await
        .expect("first datagram never arrived")
        .unwrap();
    assert_eq!(&buf[..n], b"Packet B");

    let (n, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
        .await
        .expect("second datagram never arrived")
        .unwrap();
    assert_eq!(&buf[..n], b"Packet A");
}

#[tokio::test]
async fn total_loss_drops_everything() {
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    let sender = PacketConn::new(local_udp().await, PacketProfile::new().loss(true));

    for _ in 0..10 {
        sender.send_to(b"void", peer).await.unwrap();
    }

    let mut buf = [0u8; 16];
    let outcome = timeout(Duration::from_millis(300), receiver.recv_from(&mut buf)).await;
    assert!(outcome.is_err(), "no datagram should survive total loss");
    assert_eq!(sender.stats().dropped(), 10);
    assert_eq!(sender.stats().units_tx(), 0);
}

#[tokio::test]
async fn loss_rate_lands_in_binomial_bounds() {
    const SENT: usize = 200;

    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    let sender = PacketConn::new(local_udp().await, PacketProfile::new().loss(RandomLoss::new(0.5)));

    for _ in 0..SENT {
        sender.send_to(b"coin", peer).await.unwrap();
    }

    let mut buf = [0u8; 16];
    let mut received = 0usize;
    while timeout(Duration::from_millis(300), receiver.recv_from(&mut buf)).await.is_ok() {
        received += 1;
    }

    // p = 0.5, n = 200: sigma is ~7, so 60..140 only catches a broken
    // policy, not an unlucky run.
    assert!(
        (60..=140).contains(&received),
        "{received}/{SENT} arrivals is outside binomial bounds"
    );
}

#[tokio::test]
async fn loss_reconfigures_on_the_fly() {
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    let loss = LossVar::new(1.0);
    let sender = PacketConn::new(local_udp().await, PacketProfile::new().loss(loss.clone()));

    sender.send_to(b"gone", peer).await.unwrap();
    let mut buf = [0u8; 16];
    assert!(
        timeout(Duration::from_millis(300), receiver.recv_from(&mut buf)).await.is_err(),
        "datagram should be dropped at rate 1.0"
    );

    loss.set(0.0);

    sender.send_to(b"here", peer).await.unwrap();
    let (n, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
        .await
        .expect("datagram should pass at rate 0.0")
        .unwrap();
    assert_eq!(&buf[..n], b"here");
}

#[tokio::test]
async fn oversize_payload_is_rejected() {
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    // Loopback is IPv4, so MSS = 200 - 20.
    let sender = PacketConn::new(local_udp().await, PacketProfile::new().mtu(200));
    assert_eq!(sender.mss(), 180);

    let err = sender.send_to(&[0u8; 512], peer).await.unwrap_err();
    assert!(matches!(err, LinkError::PayloadTooLarge { size: 512, limit: 180 }));

    // A payload at the limit still passes.
    sender.send_to(&[0u8; 180], peer).await.unwrap();
    let mut buf = [0u8; 256];
    let (n, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
        .await
        .expect("fitting datagram never arrived")
        .unwrap();
    assert_eq!(n, 180);
}

#[tokio::test]
async fn write_deadline_in_past_rejects() {
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    let sender = PacketConn::new(local_udp().await, PacketProfile::new());

    sender.set_write_deadline(Some(Instant::now() - Duration::from_millis(1)));
    let err = sender.send_to(b"late", peer).await.unwrap_err();
    assert!(matches!(err, LinkError::DeadlineExceeded));

    sender.set_write_deadline(None);
    sender.send_to(b"on time", peer).await.unwrap();
}

#[tokio::test]
async fn close_falls_back_to_passthrough() {
    let receiver = local_udp().await;
    let peer = receiver.local_addr().unwrap();

    // Five seconds of latency would stall the scheduled path; after close,
    // datagrams must bypass it entirely.
    let sender = PacketConn::new(
        local_udp().await,
        PacketProfile::new().latency(Duration::from_secs(5)),
    );

    sender.close().await.unwrap();
    sender.close().await.unwrap();

    sender.send_to(b"direct", peer).await.unwrap();

    let mut buf = [0u8; 16];
    let (n, _) = timeout(Duration::from_millis(500), receiver.recv_from(&mut buf))
        .await
        .expect("passthrough datagram never arrived")
        .unwrap();
    assert_eq!(&buf[..n], b"direct");
}

#[tokio::test]
async fn read_deadline_bounds_recv() {
    let receiver = PacketConn::new(local_udp().await, PacketProfile::new());

    receiver.set_read_deadline(Some(Instant::now() + Duration::from_millis(100)));

    let mut buf = [0u8; 16];
    let err = receiver.recv_from(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
}
