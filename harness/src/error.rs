use crate::checker::MismatchReport;
use logcheck_network::{NetworkError, TransportError};
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("Unknown message type {0:?}")]
    UnknownMessageType(String),
    /// The pipeline produced an event that does not match the expectation.
    #[error("{0}")]
    Validation(MismatchReport),
    #[error("Fixture {id} was expected to fail validation but passed")]
    UnexpectedPass { id: String },
    #[error("Fixture {id} failed validation differently than expected:\n{report}")]
    UnexpectedFailure { id: String, report: MismatchReport },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not parse message type registry: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Scenario task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<TransportError> for HarnessError {
    fn from(value: TransportError) -> Self {
        HarnessError::Network(value.into())
    }
}

impl HarnessError {
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            HarnessError::Network(NetworkError::Transport(e)) => Some(e),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Network(NetworkError::Timeout { .. }))
    }
}
