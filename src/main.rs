mod session;
mod transport;

use anyhow::Result;
use fsw_shared::CommandEngine;
use session::{SessionConfig, SessionManager};
use std::time::Duration;
use transport::{CommandTransport, UdpTransport};

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = SessionConfig::default();

    // The engine exists before the transport; nothing is accepted until it
    // is marked ready below
    let mut engine = CommandEngine::new();

    info!("FSW starting, initializing...");
    let ticks = config.startup_delay.as_secs();
    for i in 1..=ticks {
        tokio::time::sleep(Duration::from_secs(1)).await;
        info!("  {}.", i);
    }

    let transport = UdpTransport::bind(&config.bind_addr).await?;
    info!("Listening on {} ({})", transport.local_addr()?, transport.name());

    engine.mark_ready();
    info!("FSW Ready. Current State: {}", engine.mode());

    let mut session = SessionManager::new(transport, engine);
    session.run().await
}
