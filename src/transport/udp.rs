//! UDP implementation of the command transport

use crate::transport::traits::CommandTransport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use fsw_shared::safety;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Command channel bound to a fixed local UDP endpoint
///
/// Datagrams longer than [`safety::MAX_DATAGRAM_LEN`] are truncated by the
/// receive buffer; a truncated payload is indistinguishable from garbage
/// and classifies as unrecognized downstream.
pub struct UdpTransport {
    socket: UdpSocket,
    recv_buf: Vec<u8>,
}

impl UdpTransport {
    /// Bind to the given local endpoint
    pub async fn bind(addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("failed to bind command socket on {addr}"))?;

        Ok(Self {
            socket,
            recv_buf: vec![0u8; safety::MAX_DATAGRAM_LEN],
        })
    }
}

#[async_trait]
impl CommandTransport for UdpTransport {
    async fn recv(&mut self) -> Result<(Bytes, SocketAddr)> {
        let (len, addr) = self.socket.recv_from(&mut self.recv_buf).await?;
        Ok((Bytes::copy_from_slice(&self.recv_buf[..len]), addr))
    }

    async fn send_to(&mut self, payload: &[u8], addr: SocketAddr) -> Result<()> {
        self.socket.send_to(payload, addr).await?;
        Ok(())
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    fn name(&self) -> &'static str {
        "UDP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let mut transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"SHOW_UPTIME", addr).await.unwrap();

        let (payload, sender) = transport.recv().await.unwrap();
        assert_eq!(&payload[..], b"SHOW_UPTIME");
        assert_eq!(sender, client.local_addr().unwrap());

        transport.send_to(b"ok", sender).await.unwrap();
        let mut buf = [0u8; 16];
        let (n, _) = client.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ok");
    }

    #[tokio::test]
    async fn test_oversized_datagram_truncates() {
        let mut transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&[b'A'; 100], addr).await.unwrap();

        let (payload, _) = transport.recv().await.unwrap();
        assert_eq!(payload.len(), safety::MAX_DATAGRAM_LEN);
    }

    #[tokio::test]
    async fn test_transport_name() {
        let transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        assert_eq!(transport.name(), "UDP");
    }
}
