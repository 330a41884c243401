//! IMU sensor simulator
//!
//! Reads framed angular-rate packets from a serial line, decodes them and
//! re-broadcasts a one-line summary over UDP to the FSW command endpoint.
//! The broadcast shares the command channel, so from the FSW's perspective
//! every packet is an unrecognized command.

use anyhow::{Context, Result};
use fsw_shared::codec::FrameDecoder;
use fsw_shared::safety;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::UdpSocket;
use tokio_serial::SerialPortBuilderExt;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let port_path = std::env::args()
        .nth(1)
        .context("usage: imu-sim <serial_port>")?;

    let mut serial = tokio_serial::new(&port_path, safety::IMU_BAUD_RATE)
        .open_native_async()
        .with_context(|| format!("failed to open serial port {port_path}"))?;

    let socket = UdpSocket::bind("127.0.0.1:0").await?;

    info!("IMU simulator reading {} at {} baud", port_path, safety::IMU_BAUD_RATE);
    info!("Broadcasting to {}", safety::COMMAND_ENDPOINT);

    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 256];
    let mut ticker =
        tokio::time::interval(Duration::from_millis(safety::IMU_BROADCAST_PERIOD_MS));

    loop {
        ticker.tick().await;

        let n = match serial.read(&mut buf).await {
            Ok(0) => {
                warn!("Serial line closed");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Serial read error: {}", e);
                continue;
            }
        };
        decoder.extend(&buf[..n]);

        while let Some(frame) = decoder.next_frame() {
            info!(
                "Packet Count: {}, X: {}, Y: {}, Z: {}",
                frame.sequence, frame.x_rate_rdps, frame.y_rate_rdps, frame.z_rate_rdps
            );

            let summary = frame.summary();
            if let Err(e) = socket
                .send_to(summary.as_bytes(), safety::COMMAND_ENDPOINT)
                .await
            {
                warn!("Failed to broadcast packet {}: {}", frame.sequence, e);
            }
        }
    }
}
