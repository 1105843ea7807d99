use crate::error::{HarnessError, Result};
use logcheck_network::DEFAULT_MAX_BYTES;
use std::time::Duration;

/// Host the pipeline's producer and result ports live on.
pub const HOST_ENV: &str = "TEST_OUTPUT_HOST";
pub const TIMEOUT_ENV: &str = "LOGCHECK_TIMEOUT_MS";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub host: String,
    /// Upper bound on the wait for a normalized event.
    pub receive_timeout: Duration,
    pub max_bytes: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            receive_timeout: DEFAULT_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(host) = lookup(HOST_ENV).filter(|host| !host.is_empty()) {
            config.host = host;
        }
        if let Some(millis) = lookup(TIMEOUT_ENV) {
            let millis: u64 = millis.parse().map_err(|_| {
                HarnessError::Config(format!(
                    "{TIMEOUT_ENV}={millis:?} is not a number of milliseconds"
                ))
            })?;
            config.receive_timeout = Duration::from_millis(millis);
        }
        config.validate()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_receive_timeout(mut self, receive_timeout: Duration) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn validate(self) -> Result<Self> {
        if self.receive_timeout.is_zero() {
            return Err(HarnessError::Config("receive timeout must be non-zero".into()));
        }
        if self.max_bytes == 0 {
            return Err(HarnessError::Config("max_bytes must be non-zero".into()));
        }
        Ok(self)
    }
}
