//! Throttles an in-memory stream to 64 kbit/s and measures how long 8 KiB
//! takes to drain through the virtual wire.

use std::time::Instant;

use netem::{StreamConn, StreamProfile};
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (near, mut far) = tokio::io::duplex(64 * 1024);
    let link = StreamConn::new(near, StreamProfile::new().bandwidth(64_000u64));

    let payload = vec![0xA5u8; 8 * 1024];
    let expected = payload.len();

    let reader = tokio::spawn(async move {
        let mut received = 0;
        let mut buf = [0u8; 4096];
        while received < expected {
            match far.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => received += n,
            }
        }
        received
    });

    let start = Instant::now();
    link.write(&payload).await?;
    println!("write accepted {expected} bytes after {:?}", start.elapsed());

    let received = reader.await?;
    println!("receiver drained {received} bytes after {:?}", start.elapsed());

    link.close().await?;
    Ok(())
}
