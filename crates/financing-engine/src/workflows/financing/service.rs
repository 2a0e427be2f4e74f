use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::decision::DecisionRecord;
use super::domain::ApplicationId;
use super::engine::FinancingEngine;
use super::intake::ApplicationSubmission;
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};

/// Service composing the repository and the decision engine.
pub struct FinancingApplicationService<R> {
    repository: Arc<R>,
    engine: Arc<FinancingEngine>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Outcome of one pass over the pending queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PendingRunSummary {
    pub evaluated: usize,
    pub by_status: BTreeMap<String, usize>,
    pub application_ids: Vec<ApplicationId>,
}

impl<R> FinancingApplicationService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: Arc<FinancingEngine>) -> Self {
        Self { repository, engine }
    }

    pub fn engine(&self) -> &FinancingEngine {
        &self.engine
    }

    /// Store a submission for later evaluation. A caller-supplied id is kept.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let id = submission
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .map(ApplicationId)
            .unwrap_or_else(next_application_id);
        let stored = self
            .repository
            .insert(ApplicationRecord::pending(id, submission))?;
        Ok(stored)
    }

    /// Evaluate a stored application and persist the decision.
    pub fn evaluate(
        &self,
        application_id: &ApplicationId,
    ) -> Result<DecisionRecord, ApplicationServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;

        let decision = self.engine.evaluate_submission(&record.submission);
        record.record_decision(decision.clone());
        self.repository.update(record)?;

        Ok(decision)
    }

    /// Evaluate up to `limit` pending applications in parallel and persist every decision.
    pub fn run_pending(&self, limit: usize) -> Result<PendingRunSummary, ApplicationServiceError> {
        let pending = self.repository.pending(limit)?;
        let submissions: Vec<ApplicationSubmission> = pending
            .iter()
            .map(|record| record.submission.clone())
            .collect();
        let decisions = self.engine.evaluate_submissions(&submissions);

        let mut summary = PendingRunSummary::default();
        for (mut record, decision) in pending.into_iter().zip(decisions) {
            *summary
                .by_status
                .entry(format!("{:?}", decision.status))
                .or_insert(0) += 1;
            summary.application_ids.push(record.id.clone());
            record.record_decision(decision);
            self.repository.update(record)?;
            summary.evaluated += 1;
        }

        info!(evaluated = summary.evaluated, by_status = ?summary.by_status, "pending applications processed");
        Ok(summary)
    }

    /// Fetch an application and current status for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
