use crate::error::TransportError;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::net::{TcpStream, lookup_host};
use tokio_util::codec::Encoder;
use tracing::debug;

pub const LINE_TERMINATOR: u8 = b'\n';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Transport {
    Tcp,
    Udp,
}

impl Display for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Tcp => f.write_str("tcp"),
            Transport::Udp => f.write_str("udp"),
        }
    }
}

impl FromStr for Transport {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Transport::Tcp),
            "udp" => Ok(Transport::Udp),
            _ => Err(TransportError::UnknownTransport(s.to_string())),
        }
    }
}

impl TryFrom<String> for Transport {
    type Error = TransportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Transport> for String {
    fn from(value: Transport) -> Self {
        value.to_string()
    }
}

/// Every address `host:port` resolves to, in lookup order.
pub async fn resolve_all(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address for {host}:{port}"),
        ));
    }
    Ok(addrs)
}

/// Resolves `host:port` to its first IPv4 address. Only the UDP path uses
/// this, its outbound socket being bound to `0.0.0.0`.
pub async fn resolve_ipv4(host: &str, port: u16) -> io::Result<SocketAddr> {
    resolve_all(host, port)
        .await?
        .into_iter()
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no IPv4 address for {host}:{port}"),
            )
        })
}

/// Tries each of `addrs` in turn and returns the first connection that comes
/// up. On failure the error is the last attempt's.
pub async fn connect_any(addrs: &[SocketAddr]) -> io::Result<(TcpStream, SocketAddr)> {
    let mut last_error = None;
    for &addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok((stream, addr)),
            Err(e) => {
                debug!("Could not connect to {addr}: {e}");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "no addresses to connect to")
    }))
}

/// Line framing used on TCP producer connections.
///
/// Every encoded payload ends in exactly one [`LINE_TERMINATOR`]: one is
/// appended when missing and none is added when the payload already ends in
/// one, so `"foo"` and `"foo\n"` produce the same bytes on the wire.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminatedLineCodec;

impl<T: AsRef<str>> Encoder<T> for TerminatedLineCodec {
    type Error = io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.as_ref().as_bytes();
        dst.reserve(line.len() + 1);
        dst.put_slice(line);
        if line.last() != Some(&LINE_TERMINATOR) {
            dst.put_u8(LINE_TERMINATOR);
        }
        Ok(())
    }
}
