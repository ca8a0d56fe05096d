//! Detached reconciliation of optimistically rendered pull requests.
//!
//! Draft toggles render an optimistic flip immediately. Reconciliation
//! re-fetches the authoritative pull request in a background task, persists
//! it to the local mirror, and records a telemetry event. The triggering
//! request never waits on this work and failures are logged, not retried.

use std::sync::Arc;

use crate::github::gateway::PullRequestGateway;
use crate::github::locator::PullRequestLocator;
use crate::persistence::PullRequestMirror;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Port for scheduling a background reconciliation of one pull request.
#[cfg_attr(test, mockall::automock)]
pub trait ReconciliationScheduler: Send + Sync {
    /// Schedules a reconciliation pass and returns immediately.
    fn schedule(&self, locator: PullRequestLocator);
}

/// Scheduler that drops every request, for read-only contexts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReconciliationScheduler;

impl ReconciliationScheduler for NoopReconciliationScheduler {
    fn schedule(&self, _locator: PullRequestLocator) {}
}

/// Spawns reconciliation passes onto the ambient Tokio runtime.
pub struct TokioReconciliationScheduler {
    pull_requests: Arc<dyn PullRequestGateway>,
    mirror: Arc<dyn PullRequestMirror>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl TokioReconciliationScheduler {
    /// Creates a scheduler over the given gateway, mirror, and telemetry
    /// sink.
    #[must_use]
    pub fn new(
        pull_requests: Arc<dyn PullRequestGateway>,
        mirror: Arc<dyn PullRequestMirror>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            pull_requests,
            mirror,
            telemetry,
        }
    }
}

impl ReconciliationScheduler for TokioReconciliationScheduler {
    fn schedule(&self, locator: PullRequestLocator) {
        let pull_requests = Arc::clone(&self.pull_requests);
        let mirror = Arc::clone(&self.mirror);
        let telemetry = Arc::clone(&self.telemetry);
        drop(tokio::spawn(async move {
            reconcile(
                pull_requests.as_ref(),
                mirror.as_ref(),
                telemetry.as_ref(),
                &locator,
            )
            .await;
        }));
    }
}

async fn reconcile(
    pull_requests: &dyn PullRequestGateway,
    mirror: &dyn PullRequestMirror,
    telemetry: &dyn TelemetrySink,
    locator: &PullRequestLocator,
) {
    let pull_request = match pull_requests.pull_request(locator).await {
        Ok(pull_request) => pull_request,
        Err(error) => {
            tracing::warn!(
                repository = %locator.full_name(),
                number = locator.number().get(),
                error = %error,
                "reconciliation re-fetch failed"
            );
            return;
        }
    };

    if let Err(error) = mirror.record(&pull_request) {
        tracing::warn!(
            repository = %pull_request.repository,
            number = pull_request.number,
            error = %error,
            "reconciliation mirror write failed"
        );
        return;
    }

    telemetry.record(TelemetryEvent::ReconciliationRecorded {
        repository: pull_request.repository.clone(),
        number: pull_request.number,
        draft: pull_request.draft,
    });
}
