use crate::error::TransportError;
use crate::protocol::{TerminatedLineCodec, Transport, connect_any, resolve_all, resolve_ipv4};
use futures::SinkExt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::AsyncWriteExt;
use tokio::net::UdpSocket;
use tokio_util::codec::FramedWrite;
use tracing::debug;

pub type Result<T> = std::result::Result<T, TransportError>;

/// Writes raw log lines to a pipeline's producer endpoints.
///
/// TCP sends open a fresh connection per payload. UDP sends all go out through
/// one socket bound when the sender is created, so every datagram from this
/// sender carries the same source port. The socket is closed when the sender
/// is dropped.
pub struct TransportSender {
    host: String,
    udp: UdpSocket,
}

impl TransportSender {
    pub async fn bind(host: impl Into<String>) -> Result<Self> {
        let udp = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(TransportError::Bind)?;
        let host = host.into();
        debug!(
            "Outbound UDP socket bound to {:?} for host {host}",
            udp.local_addr()
        );
        Ok(Self { host, udp })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn udp_local_addr(&self) -> io::Result<SocketAddr> {
        self.udp.local_addr()
    }

    pub async fn send(
        &self,
        destination_port: u16,
        transport: Transport,
        payload: &str,
    ) -> Result<()> {
        debug!("Sending {payload:?} to {}:{destination_port} via {transport}", self.host);
        match transport {
            Transport::Tcp => self.send_tcp(destination_port, payload).await,
            Transport::Udp => self.send_udp(destination_port, payload).await,
        }
    }

    /// Like [`TransportSender::send`], with the transport given by name.
    pub async fn send_str(
        &self,
        destination_port: u16,
        transport: &str,
        payload: &str,
    ) -> Result<()> {
        let transport = transport.parse()?;
        self.send(destination_port, transport, payload).await
    }

    fn resolve_error(&self, port: u16) -> impl FnOnce(io::Error) -> TransportError + '_ {
        move |source| TransportError::Resolve {
            host: self.host.clone(),
            port,
            source,
        }
    }

    // Any resolved address will do, IPv6 included
    async fn send_tcp(&self, port: u16, payload: &str) -> Result<()> {
        let addrs = resolve_all(&self.host, port)
            .await
            .map_err(self.resolve_error(port))?;
        let (stream, addr) = connect_any(&addrs)
            .await
            .map_err(|source| TransportError::Connect {
                host: self.host.clone(),
                port,
                source,
            })?;
        let mut writer = FramedWrite::new(stream, TerminatedLineCodec);
        writer
            .send(payload)
            .await
            .map_err(|source| TransportError::Write { addr, source })?;
        writer
            .into_inner()
            .shutdown()
            .await
            .map_err(|source| TransportError::Write { addr, source })
    }

    async fn send_udp(&self, port: u16, payload: &str) -> Result<()> {
        let addr = resolve_ipv4(&self.host, port)
            .await
            .map_err(self.resolve_error(port))?;
        let sent = self
            .udp
            .send_to(payload.as_bytes(), addr)
            .await
            .map_err(|source| TransportError::Write { addr, source })?;
        debug!("Sent {sent} byte datagram to {addr}");
        Ok(())
    }
}
