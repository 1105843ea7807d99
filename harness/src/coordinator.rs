use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::registry::{MessageTypeInfo, Registry};
use logcheck_network::{ResultListener, TransportSender};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info_span};

/// Correlates one trigger with the normalized event it causes.
///
/// Every round trip runs in two phases:
///
/// 1. connect to the message type's result port, and only once that
///    connection is established
/// 2. fire the trigger (a raw send, or any action that makes the pipeline emit
///    one event), then wait for and decode the single result buffer.
///
/// The pipeline pushes results to whoever is connected when the event is
/// produced, so the trigger is never issued before phase 1 completes.
///
/// Message types with different result ports run fully in parallel. Round
/// trips that share a result port take turns, otherwise one could read the
/// other's event.
pub struct Coordinator {
    registry: Registry,
    sender: Arc<TransportSender>,
    config: HarnessConfig,
    result_ports: HashMap<u16, Mutex<()>>,
}

impl Coordinator {
    pub async fn new(registry: Registry, config: HarnessConfig) -> Result<Self> {
        let config = config.validate()?;
        let sender = TransportSender::bind(config.host.clone()).await?;
        Ok(Self::with_sender(registry, config, Arc::new(sender)))
    }

    pub fn with_sender(
        registry: Registry,
        config: HarnessConfig,
        sender: Arc<TransportSender>,
    ) -> Self {
        let result_ports = registry
            .iter()
            .map(|info| (info.result_port, Mutex::new(())))
            .collect();
        Self {
            registry,
            sender,
            config,
            result_ports,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn sender(&self) -> Arc<TransportSender> {
        self.sender.clone()
    }

    /// Sends `raw_payload` as `message_type` and returns the decoded event.
    pub async fn round_trip(&self, message_type: &str, raw_payload: &str) -> Result<Value> {
        let MessageTypeInfo {
            transport,
            destination_port,
            ..
        } = *self.registry.lookup(message_type)?;
        let sender = &self.sender;
        self.round_trip_with(message_type, || async move {
            sender.send(destination_port, transport, raw_payload).await
        })
        .await
    }

    /// Runs `trigger` once the result connection for `message_type` is up and
    /// returns the decoded event it caused.
    pub async fn round_trip_with<F, Fut, E>(&self, message_type: &str, trigger: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<HarnessError>,
    {
        let info = self.registry.lookup(message_type)?;
        let span = info_span!("round_trip", message_type, result_port = info.result_port);
        async move {
            let _turn = match self.result_ports.get(&info.result_port) {
                Some(port) => Some(port.lock().await),
                None => None,
            };

            let listener = ResultListener::connect(&self.config.host, info.result_port).await?;
            debug!("Result listener ready, triggering");
            trigger().await.map_err(Into::<HarnessError>::into)?;

            let raw = listener
                .receive(self.config.max_bytes, self.config.receive_timeout)
                .await?;
            Ok(raw.decode()?)
        }
        .instrument(span)
        .await
    }
}
