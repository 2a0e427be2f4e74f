use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::{DecisionRecord, DecisionStatus};
use super::domain::ApplicationId;
use super::intake::ApplicationSubmission;

/// Processing state of a stored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Evaluated,
    /// Evaluated, but the submission could not be read.
    Failed,
}

impl ApplicationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Evaluated => "evaluated",
            ApplicationStatus::Failed => "failed",
        }
    }
}

/// Repository record containing the submission, processing status and last decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub submission: ApplicationSubmission,
    pub status: ApplicationStatus,
    pub decision: Option<DecisionRecord>,
    pub submitted_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    pub fn pending(id: ApplicationId, submission: ApplicationSubmission) -> Self {
        Self {
            id,
            submission,
            status: ApplicationStatus::Pending,
            decision: None,
            submitted_at: Utc::now(),
            evaluated_at: None,
        }
    }

    pub fn record_decision(&mut self, decision: DecisionRecord) {
        self.status = if decision.status == DecisionStatus::InvalidInput {
            ApplicationStatus::Failed
        } else {
            ApplicationStatus::Evaluated
        };
        self.decision = Some(decision);
        self.evaluated_at = Some(Utc::now());
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            status: self.status.label(),
            decision: self.decision.as_ref().map(|decision| decision.status),
            status_label: self
                .decision
                .as_ref()
                .map(|decision| decision.status_label.clone()),
            score: self.decision.as_ref().map(|decision| decision.score),
            submitted_at: self.submitted_at,
            evaluated_at: self.evaluated_at,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    /// Up to `limit` records still waiting for a decision, oldest first.
    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Summary of an application exposed by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<DateTime<Utc>>,
}
