use super::common::*;
use crate::workflows::financing::decision::DecisionStatus;
use crate::workflows::financing::domain::ApplicationId;
use crate::workflows::financing::repository::{ApplicationRepository, ApplicationStatus, RepositoryError};
use crate::workflows::financing::{ApplicationServiceError, FinancingApplicationService};
use std::sync::Arc;

#[test]
fn submit_keeps_caller_id_and_stores_pending_record() {
    let (service, repository) = build_service();

    let record = service
        .submit(submission_with_id("order-77"))
        .expect("submission stored");
    assert_eq!(record.id, ApplicationId("order-77".to_string()));
    assert_eq!(record.status, ApplicationStatus::Pending);
    assert!(record.decision.is_none());

    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.submission, submission_with_id("order-77"));
}

#[test]
fn submit_generates_ids_when_missing() {
    let (service, _) = build_service();
    let first = service.submit(submission()).expect("stored");
    let second = service.submit(submission()).expect("stored");
    assert_ne!(first.id, second.id);
    assert!(first.id.0.starts_with("app-"));
}

#[test]
fn submit_propagates_conflicts() {
    let service = FinancingApplicationService::new(Arc::new(ConflictRepository), engine());
    match service.submit(submission()) {
        Err(ApplicationServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn evaluate_persists_decision() {
    let (service, repository) = build_service();
    let record = service.submit(submission_with_id("order-1")).expect("stored");

    let decision = service.evaluate(&record.id).expect("evaluated");
    assert_eq!(decision.status, DecisionStatus::Approve);

    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, ApplicationStatus::Evaluated);
    assert_eq!(stored.decision, Some(decision));
    assert!(stored.evaluated_at.is_some());
}

#[test]
fn unreadable_submission_is_marked_failed() {
    let (service, repository) = build_service();
    let record = service
        .submit(unreadable_submission())
        .expect("unreadable submissions are still stored");

    let decision = service.evaluate(&record.id).expect("evaluated");
    assert_eq!(decision.status, DecisionStatus::InvalidInput);
    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, ApplicationStatus::Failed);
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();
    match service.get(&ApplicationId("missing".to_string())) {
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn run_pending_respects_limit_and_skips_evaluated() {
    let (service, repository) = build_service();
    for id in ["order-a", "order-b", "order-c"] {
        service.submit(submission_with_id(id)).expect("stored");
    }
    service
        .evaluate(&ApplicationId("order-b".to_string()))
        .expect("evaluated");

    let summary = service.run_pending(1).expect("run succeeds");
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.by_status.get("Approve"), Some(&1));

    let summary = service.run_pending(10).expect("run succeeds");
    assert_eq!(summary.evaluated, 1);
    assert!(!summary
        .application_ids
        .contains(&ApplicationId("order-b".to_string())));

    assert!(repository.pending(10).expect("pending").is_empty());
    assert_eq!(service.run_pending(10).expect("run succeeds").evaluated, 0);
}

#[test]
fn run_pending_propagates_repository_failures() {
    let service = FinancingApplicationService::new(Arc::new(UnavailableRepository), engine());
    match service.run_pending(5) {
        Err(ApplicationServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}
