use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::financing::domain::{ApplicantProfile, ApplicationId, JobCategory, ProductType};
use crate::workflows::financing::engine::FinancingEngine;
use crate::workflows::financing::intake::{ApplicationSubmission, FieldInput};
use crate::workflows::financing::repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatus, RepositoryError,
};
use crate::workflows::financing::{financing_router, FinancingApplicationService};

pub(super) fn engine() -> Arc<FinancingEngine> {
    Arc::new(FinancingEngine::standard().expect("standard policy compiles"))
}

/// Well-paid employee asking for a general-purpose loan; clears every check.
pub(super) fn approvable_profile() -> ApplicantProfile {
    ApplicantProfile::new(
        10_000_000.0,
        100_000_000.0,
        JobCategory::Employee,
        ProductType::GeneralDana,
    )
}

/// Car applicant below the income floor while carrying other debt.
pub(super) fn car_with_obligations_profile() -> ApplicantProfile {
    ApplicantProfile::new(
        6_000_000.0,
        150_000_000.0,
        JobCategory::Employee,
        ProductType::CarUsed,
    )
    .with_other_obligations(3_000_000.0)
}

/// Quoted installment and obligations that no rule antecedent covers.
pub(super) fn uncovered_profile() -> ApplicantProfile {
    ApplicantProfile::new(
        5_000_000.0,
        20_000_000.0,
        JobCategory::Employee,
        ProductType::GeneralDana,
    )
    .with_other_obligations(1_000_000.0)
    .with_installment(1_400_000.0)
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        salary: Some(FieldInput::from("Rp 10.000.000")),
        requested_amount: Some(FieldInput::from("100 juta")),
        other_obligations: Some(FieldInput::Number(0.0)),
        product: Some("general".to_string()),
        job: Some("karyawan".to_string()),
        ..ApplicationSubmission::default()
    }
}

pub(super) fn submission_with_id(id: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        id: Some(id.to_string()),
        ..submission()
    }
}

pub(super) fn unreadable_submission() -> ApplicationSubmission {
    ApplicationSubmission {
        salary: Some(FieldInput::from("sepuluh juta")),
        ..submission()
    }
}

pub(super) fn build_service() -> (
    FinancingApplicationService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = FinancingApplicationService::new(repository.clone(), engine());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut pending: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.status == ApplicationStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        pending.truncate(limit);
        Ok(pending)
    }
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: FinancingApplicationService<MemoryRepository>,
) -> axum::Router {
    financing_router(Arc::new(service))
}
