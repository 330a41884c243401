//! Transport trait abstraction for the command channel

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;

/// A connectionless, message-oriented channel for command datagrams
///
/// Each inbound unit is an independent payload; each outbound unit is
/// addressed explicitly. The session loop always replies to the address the
/// most recent datagram arrived from.
#[async_trait]
pub trait CommandTransport: Send {
    /// Block until the next datagram arrives, returning payload and sender
    async fn recv(&mut self) -> Result<(Bytes, SocketAddr)>;

    /// Send a payload to the given address
    async fn send_to(&mut self, payload: &[u8], addr: SocketAddr) -> Result<()>;

    /// The locally bound address
    fn local_addr(&self) -> Result<SocketAddr>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
