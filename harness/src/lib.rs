//! Round-trip test harness for a log-ingestion pipeline.
//!
//! A raw message is sent to the pipeline's producer port for its message type,
//! the normalized JSON event is read back from the matching result port, and
//! the event is compared against a partial expectation addressed by dotted
//! paths.

pub mod checker;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fixtures;
pub mod forward;
pub mod registry;
pub mod samples;
pub mod scenario;

pub use checker::{Expectation, Mismatch, MismatchKind, MismatchReport, check, dotted_get};
pub use config::HarnessConfig;
pub use coordinator::Coordinator;
pub use error::{HarnessError, Result};
pub use fixtures::{FailFixture, Fixture};
pub use registry::{MessageTypeInfo, Registry};
pub use scenario::{ScenarioReport, ScenarioRunner, check_timestamp};
