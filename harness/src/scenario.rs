use crate::checker::{Mismatch, MismatchReport, check, dotted_get};
use crate::coordinator::Coordinator;
use crate::error::{HarnessError, Result};
use crate::fixtures::{FailFixture, Fixture};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Field every normalized event must carry.
pub const TIMESTAMP_KEY: &str = "log.timestamp";

/// Separate from the fixture's own expectation: passes as long as the event
/// has a timestamp at all, whatever its value.
pub fn check_timestamp(result: &Value) -> Result<()> {
    match dotted_get(result, TIMESTAMP_KEY) {
        Some(_) => Ok(()),
        None => MismatchReport::from_iter([Mismatch::Missing {
            key: TIMESTAMP_KEY.to_string(),
        }])
        .into_result(),
    }
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub id: String,
    pub outcome: Result<()>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct ScenarioRunner {
    coordinator: Arc<Coordinator>,
}

impl ScenarioRunner {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Round trip, then require the expectation and the timestamp to hold.
    pub async fn run_pass(&self, fixture: &Fixture) -> Result<Value> {
        run_pass(&self.coordinator, fixture).await
    }

    /// Round trip, then require the checker to reject the expectation with
    /// `expected_failure` for every key. Returns the report it produced.
    pub async fn run_fail(&self, fail: &FailFixture) -> Result<MismatchReport> {
        run_fail(&self.coordinator, fail).await
    }

    /// Runs every scenario on its own task. Reports come back in input order,
    /// passing fixtures first.
    pub async fn run_all(&self, pass: Vec<Fixture>, fail: Vec<FailFixture>) -> Vec<ScenarioReport> {
        let mut handles = Vec::with_capacity(pass.len() + fail.len());
        for fixture in pass {
            let coordinator = self.coordinator.clone();
            handles.push((
                fixture.id.clone(),
                tokio::spawn(async move { run_pass(&coordinator, &fixture).await.map(|_| ()) }),
            ));
        }
        for fail in fail {
            let coordinator = self.coordinator.clone();
            handles.push((
                fail.fixture.id.clone(),
                tokio::spawn(async move { run_fail(&coordinator, &fail).await.map(|_| ()) }),
            ));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = handle.await.unwrap_or_else(|e| Err(e.into()));
            match &outcome {
                Ok(()) => info!("{id}: passed"),
                Err(e) => warn!("{id}: failed: {e}"),
            }
            reports.push(ScenarioReport { id, outcome });
        }
        reports
    }
}

async fn run_pass(coordinator: &Coordinator, fixture: &Fixture) -> Result<Value> {
    let result = coordinator
        .round_trip(&fixture.message_type, &fixture.raw_payload)
        .await?;
    check(&fixture.expectation, &result).into_result()?;
    check_timestamp(&result)?;
    Ok(result)
}

async fn run_fail(coordinator: &Coordinator, fail: &FailFixture) -> Result<MismatchReport> {
    let fixture = &fail.fixture;
    let result = coordinator
        .round_trip(&fixture.message_type, &fixture.raw_payload)
        .await?;
    let report = check(&fixture.expectation, &result);
    if report.is_empty() {
        return Err(HarnessError::UnexpectedPass {
            id: fixture.id.clone(),
        });
    }

    let as_expected = fixture.expectation.keys().all(|key| {
        report
            .get(key)
            .is_some_and(|mismatch| mismatch.kind() == fail.expected_failure)
    });
    if !as_expected {
        return Err(HarnessError::UnexpectedFailure {
            id: fixture.id.clone(),
            report,
        });
    }
    Ok(report)
}
