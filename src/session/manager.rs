//! Session manager driving the receive/process/respond loop

use crate::transport::CommandTransport;
use anyhow::Result;
use fsw_shared::{safety, CommandEngine, Disposition};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the command session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Local endpoint to bind the command socket to
    pub bind_addr: String,
    /// Initialization window before the engine starts accepting commands
    pub startup_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bind_addr: safety::COMMAND_ENDPOINT.into(),
            startup_delay: Duration::from_secs(safety::STARTUP_DELAY_SECS),
        }
    }
}

/// Runs the command session: one datagram fully processed at a time, in
/// arrival order, responses routed to the most recent sender.
pub struct SessionManager<T: CommandTransport> {
    transport: T,
    engine: CommandEngine,
}

impl<T: CommandTransport> SessionManager<T> {
    /// Create a session over a bound transport
    pub fn new(transport: T, engine: CommandEngine) -> Self {
        Self { transport, engine }
    }

    /// Run the session loop until a shutdown is commanded.
    ///
    /// Returns `Ok(())` on a commanded shutdown; the caller exits the
    /// process. Transport receive errors are fatal, send errors are not.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let (payload, sender) = self.transport.recv().await?;
            let token = String::from_utf8_lossy(&payload);

            info!("Processing command: {}", token);

            match self.engine.process(&token) {
                Disposition::Dropped => {
                    debug!("FSW still initializing, dropped datagram from {}", sender);
                }
                Disposition::Accepted { response } | Disposition::Rejected { response } => {
                    self.send_response(&response, sender).await;
                }
                Disposition::ShutdownRequested { response } => {
                    self.send_response(&response, sender).await;
                    info!("Shutdown commanded, terminating");
                    return Ok(());
                }
            }

            info!(
                "Current State: {}  Cmds Rcvd: {}  Invalid Cmds: {}  Safe Modes: {}",
                self.engine.mode(),
                self.engine.valid_command_count(),
                self.engine.consecutive_invalid_count(),
                self.engine.safe_mode_entry_count()
            );
        }
    }

    /// Send a response, logging failures.
    ///
    /// A failed send does not affect engine state; the datagram counts as
    /// processed either way.
    async fn send_response(&mut self, response: &str, addr: SocketAddr) {
        debug!("Sending message: {}", response);
        if let Err(e) = self.transport.send_to(response.as_bytes(), addr).await {
            warn!("Failed to send response to {}: {}", addr, e);
        }
    }
}
