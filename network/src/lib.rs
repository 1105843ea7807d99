//! Wire layer for exercising a log-ingestion pipeline: framed producer sends
//! over TCP or UDP and one-shot JSON reads from the pipeline's result port.

pub mod error;
pub mod protocol;
pub mod receiver;
pub mod sender;

pub use error::{NetworkError, Result, TransportError, TransportErrorKind};
pub use protocol::Transport;
pub use receiver::{DEFAULT_MAX_BYTES, RawResult, ResultListener};
pub use sender::TransportSender;
