use crate::error::{NetworkError, Result};
use crate::protocol::{connect_any, resolve_all};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

pub const DEFAULT_MAX_BYTES: usize = 8192;

/// An established connection to a pipeline's result endpoint.
///
/// The pipeline pushes normalized events to whoever is connected, so the
/// listener has to exist before the triggering message is sent. Creating a
/// `ResultListener` is the "ready" step; [`ResultListener::receive`] consumes
/// it, so the connection is closed on every path out of the receive.
///
/// Each connection is expected to carry exactly one event, delivered in a
/// single read. No reassembly is attempted.
pub struct ResultListener {
    stream: TcpStream,
    port: u16,
}

impl ResultListener {
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let addrs = resolve_all(host, port)
            .await
            .map_err(|source| NetworkError::Connection { port, source })?;
        let (stream, addr) = connect_any(&addrs)
            .await
            .map_err(|source| NetworkError::Connection { port, source })?;
        debug!("Listening for results from {addr}");
        Ok(Self { stream, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.local_addr()
    }

    /// Waits up to `deadline` for one buffer of at most `max_bytes`.
    pub async fn receive(mut self, max_bytes: usize, deadline: Duration) -> Result<RawResult> {
        let port = self.port;
        let mut buffer = vec![0u8; max_bytes.max(1)];
        let read = match timeout(deadline, self.stream.read(&mut buffer)).await {
            Err(_) => return Err(NetworkError::Timeout { port, after: deadline }),
            Ok(Err(source)) => return Err(NetworkError::Connection { port, source }),
            Ok(Ok(0)) => return Err(NetworkError::Closed { port }),
            Ok(Ok(read)) => read,
        };
        buffer.truncate(read);
        debug!("Received {:?} on port {port}", String::from_utf8_lossy(&buffer));
        Ok(RawResult { port, bytes: buffer })
    }
}

/// Undecoded bytes from one result connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    port: u16,
    bytes: Vec<u8>,
}

impl RawResult {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn decode(self) -> Result<Value> {
        serde_json::from_slice(&self.bytes).map_err(|source| NetworkError::Decode {
            raw: self.bytes,
            source,
        })
    }
}
