//! Ships local `tracing` events to a pipeline's producer port as
//! `python-event-0` JSON lines, so a logging call can be the trigger of a
//! round trip.

use logcheck_network::{Transport, TransportSender};
use serde_json::{Map, Value, json};
use std::fmt::Write;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

pub const FORWARD_SCHEMA: &str = "python-event-0";

/// The harness's own events are never forwarded, including the warning
/// logged when a forward fails.
const OWN_TARGET_PREFIX: &str = "logcheck";

pub struct ForwardLayer {
    queue: async_channel::Sender<String>,
    hostname: String,
}

impl ForwardLayer {
    /// Builds the layer plus the task draining it into `sender`. The task ends
    /// once the layer is dropped.
    pub fn spawn(
        sender: Arc<TransportSender>,
        port: u16,
        transport: Transport,
    ) -> (Self, JoinHandle<()>) {
        let (queue, events) = async_channel::unbounded::<String>();
        let task = tokio::spawn(async move {
            while let Ok(line) = events.recv().await {
                if let Err(e) = sender.send(port, transport, &line).await {
                    tracing::warn!("Could not forward event to port {port}: {e}");
                }
            }
        });
        let hostname = local_hostname();
        (Self { queue, hostname }, task)
    }

    fn convert_level(level: &tracing::Level) -> &'static str {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => "DEBUG",
            tracing::Level::INFO => "INFO",
            tracing::Level::WARN => "WARNING",
            tracing::Level::ERROR => "ERROR",
        }
    }
}

pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

// Collects the message plus any extra fields of an event
struct FieldCollector<'a> {
    message: &'a mut String,
    extra: &'a mut Map<String, Value>,
}

impl tracing::field::Visit for FieldCollector<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.extra
                .insert(field.name().to_string(), Value::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_owned();
        } else {
            self.extra.insert(field.name().to_string(), Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.extra.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.extra.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.extra.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.extra.insert(field.name().to_string(), Value::from(value));
    }
}

impl<S> Layer<S> for ForwardLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(OWN_TARGET_PREFIX) {
            return;
        }

        let mut message = String::new();
        let mut extra = Map::new();
        event.record(&mut FieldCollector {
            message: &mut message,
            extra: &mut extra,
        });

        let pathname = metadata.file().unwrap_or("");
        let filename = pathname.rsplit(['/', '\\']).next().unwrap_or(pathname);
        let lineno = metadata.line().unwrap_or(0);
        let line = json!({
            "schema": FORWARD_SCHEMA,
            "msg": message,
            "levelname": Self::convert_level(metadata.level()),
            "name": metadata.target(),
            "pathname": pathname,
            "filename": filename,
            "lineno": lineno,
            "source": format!("{}:{lineno}", metadata.target()),
            "hostname": self.hostname,
            "versions": {"logcheck": env!("CARGO_PKG_VERSION")},
            "extra": extra,
        });

        // Unbounded, so this only fails once the forwarding task is gone
        let _ = self.queue.try_send(line.to_string());
    }
}
