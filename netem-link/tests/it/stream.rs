use std::time::Duration;

use netem_link::{LinkError, StreamConn, StreamProfile};
use netem_policy::{LatencyVar, RandomJitter};
use tokio::{
    io::{AsyncReadExt, DuplexStream},
    time::Instant,
};

fn conn_pair(profile: StreamProfile) -> (StreamConn<DuplexStream>, DuplexStream) {
    let (near, far) = tokio::io::duplex(64 * 1024);
    (StreamConn::new(near, profile), far)
}

#[tokio::test(start_paused = true)]
async fn latency_delays_delivery() {
    let _ = tracing_subscriber::fmt::try_init();
    let (conn, mut far) = conn_pair(StreamProfile::new().latency(Duration::from_millis(100)));

    let start = Instant::now();
    let n = conn.write(b"ping").await.unwrap();
    assert_eq!(n, 4);

    let mut buf = [0u8; 16];
    let n = far.read(&mut buf).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(&buf[..n], b"ping");
    assert!(elapsed >= Duration::from_millis(100), "arrived too fast: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(150), "arrived too slow: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn ordering_survives_adversarial_jitter() {
    // ±50ms of jitter on a 100ms base regularly asks a later chunk to
    // depart before an earlier one; the serial wire must refuse.
    let (conn, mut far) = conn_pair(
        StreamProfile::new()
            .latency(Duration::from_millis(100))
            .jitter(RandomJitter::new(Duration::from_millis(50))),
    );

    conn.write(b"Hello").await.unwrap();
    conn.write(b"World").await.unwrap();

    let mut buf = [0u8; 10];
    far.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"HelloWorld");
}

#[tokio::test(start_paused = true)]
async fn latency_reconfigures_on_the_fly() {
    let latency = LatencyVar::new(Duration::from_millis(10));
    let (conn, mut far) = conn_pair(StreamProfile::new().latency(latency.clone()));

    let mut buf = [0u8; 1];

    let start = Instant::now();
    conn.write(b"x").await.unwrap();
    far.read_exact(&mut buf).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(50), "first trip too slow");

    latency.set(Duration::from_millis(200));

    let start = Instant::now();
    conn.write(b"y").await.unwrap();
    far.read_exact(&mut buf).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200), "update not applied");
}

#[tokio::test(start_paused = true)]
async fn bandwidth_throttles_serialization() {
    // 8 kbit/s: 60 payload bytes plus the 40-byte header estimate for an
    // address-less pipe is 800 bits, i.e. 100ms on the wire.
    let (conn, mut far) = conn_pair(StreamProfile::new().bandwidth(8_000u64));

    let start = Instant::now();
    conn.write(&[7u8; 60]).await.unwrap();

    let mut buf = [0u8; 60];
    far.read_exact(&mut buf).await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(100), "serialized too fast: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(150), "serialized too slow: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn chunks_reassemble_in_submission_order() {
    // MTU 100 against the 40-byte estimate gives a 60-byte MSS, so 1 KiB
    // crosses the link in 18 chunks.
    let (conn, mut far) = conn_pair(StreamProfile::new().mtu(100));
    assert_eq!(conn.mss(), 60);

    let payload: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
    let n = conn.write(&payload).await.unwrap();
    assert_eq!(n, payload.len());

    let mut received = vec![0u8; payload.len()];
    far.read_exact(&mut received).await.unwrap();
    assert_eq!(received, payload);
    assert_eq!(conn.stats().bytes_tx(), payload.len());
    assert_eq!(conn.stats().units_tx(), 18);
}

#[tokio::test(start_paused = true)]
async fn payloads_are_copied_eagerly() {
    let (conn, mut far) = conn_pair(StreamProfile::new().latency(Duration::from_millis(50)));

    let mut buf = *b"original";
    conn.write(&buf).await.unwrap();
    // The chunk is still queued for another 50ms; clobbering the source
    // buffer must not affect what is emitted.
    buf.copy_from_slice(b"clobber!");

    let mut received = [0u8; 8];
    far.read_exact(&mut received).await.unwrap();
    assert_eq!(&received, b"original");
}

#[tokio::test(start_paused = true)]
async fn reads_are_not_impaired_and_honor_the_read_deadline() {
    use tokio::io::AsyncWriteExt;

    // A full second of egress latency must not delay the receive path.
    let (conn, mut far) = conn_pair(StreamProfile::new().latency(Duration::from_secs(1)));
    assert!(conn.local_addr().is_none(), "pipes have no address");

    far.write_all(b"inbound").await.unwrap();

    let start = Instant::now();
    let mut buf = [0u8; 16];
    let n = conn.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"inbound");
    assert!(start.elapsed() < Duration::from_millis(100));

    conn.set_read_deadline(Some(Instant::now() + Duration::from_millis(100)));
    let err = conn.read(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
}

#[tokio::test]
async fn tcp_link_works_end_to_end() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = tokio::net::TcpStream::connect(addr).await.unwrap();
    let (mut server, _) = listener.accept().await.unwrap();

    let conn = StreamConn::new(client, StreamProfile::new().latency(Duration::from_millis(50)));
    assert_eq!(conn.peer_addr(), Some(addr));
    // Loopback is IPv4, so the MSS reflects the 20-byte header estimate.
    assert_eq!(conn.mss(), 1480);

    let start = Instant::now();
    conn.write(b"over tcp").await.unwrap();

    let mut buf = [0u8; 8];
    server.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"over tcp");
    assert!(start.elapsed() >= Duration::from_millis(50), "arrived too fast");
}

#[tokio::test(start_paused = true)]
async fn write_deadline_in_past_rejects() {
    let (conn, _far) = conn_pair(StreamProfile::new());

    conn.set_write_deadline(Some(Instant::now() - Duration::from_millis(1)));
    let err = conn.write(b"late").await.unwrap_err();
    assert!(matches!(err, LinkError::DeadlineExceeded));

    // Clearing the deadline restores the link.
    conn.set_write_deadline(None);
    assert_eq!(conn.write(b"late").await.unwrap(), 4);
}

#[tokio::test(start_paused = true)]
async fn fault_severs_the_link() {
    let (conn, mut far) = conn_pair(StreamProfile::new().fault(true));

    conn.write(b"doomed").await.unwrap();

    // The fault fires on the first queued chunk: nothing is emitted and
    // the peer observes EOF.
    let mut buf = [0u8; 8];
    let n = far.read(&mut buf).await.unwrap();
    assert_eq!(n, 0);
    assert_eq!(conn.stats().faults(), 1);
    assert_eq!(conn.stats().bytes_tx(), 0);

    // The next write takes the flush path and observes the dead endpoint.
    assert!(conn.write(b"after").await.is_err());
}

#[tokio::test(start_paused = true)]
async fn close_is_idempotent_and_stops_the_link() {
    let (conn, mut far) = conn_pair(StreamProfile::new());

    conn.close().await.unwrap();
    conn.close().await.unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(far.read(&mut buf).await.unwrap(), 0, "peer should see EOF");

    // Writes after close fall back to the direct path, which fails on the
    // shut-down endpoint.
    assert!(conn.write(b"x").await.is_err());
}
