use std::io;
use std::net::SocketAddr;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Coarse classification of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    UnknownTransport,
    Resolve,
    Bind,
    Connect,
    Write,
}

/// Failures on the producer side of a round trip. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Unknown transport {0:?}, expected \"tcp\" or \"udp\"")]
    UnknownTransport(String),
    #[error("Could not resolve host {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("Could not bind outbound UDP socket: {0}")]
    Bind(#[source] io::Error),
    #[error("Could not connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("Could not write to {addr}: {source}")]
    Write {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::UnknownTransport(_) => TransportErrorKind::UnknownTransport,
            TransportError::Resolve { .. } => TransportErrorKind::Resolve,
            TransportError::Bind(_) => TransportErrorKind::Bind,
            TransportError::Connect { .. } => TransportErrorKind::Connect,
            TransportError::Write { .. } => TransportErrorKind::Write,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("No result on port {port} within {after:?}")]
    Timeout { port: u16, after: Duration },
    #[error("Result connection on port {port} failed: {source}")]
    Connection {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("Result connection on port {port} closed before any data arrived")]
    Closed { port: u16 },
    #[error("Did not receive valid JSON from pipeline: {}", String::from_utf8_lossy(raw))]
    Decode {
        raw: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },
}
