use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ApplicationId;
use super::intake::ApplicationSubmission;
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationServiceError, FinancingApplicationService};

const DEFAULT_RUN_LIMIT: usize = 100;
pub(crate) const MAX_RUN_LIMIT: usize = 500;

/// Router builder exposing HTTP endpoints for evaluation, intake and the pending run.
pub fn financing_router<R>(service: Arc<FinancingApplicationService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/financing/evaluations",
            post(evaluate_submission_handler::<R>),
        )
        .route("/api/v1/financing/applications", post(submit_handler::<R>))
        .route(
            "/api/v1/financing/applications/run",
            post(run_pending_handler::<R>),
        )
        .route(
            "/api/v1/financing/applications/:application_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/financing/applications/:application_id/evaluate",
            post(evaluate_application_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

/// Stateless evaluation: nothing is stored.
pub(crate) async fn evaluate_submission_handler<R>(
    State(service): State<Arc<FinancingApplicationService<R>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let decision = service.engine().evaluate_submission(&submission);
    (StatusCode::OK, axum::Json(decision)).into_response()
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<FinancingApplicationService<R>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<FinancingApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => {
            let payload = json!({
                "application": record.status_view(),
                "decision": record.decision,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluate_application_handler<R>(
    State(service): State<Arc<FinancingApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.evaluate(&ApplicationId(application_id)) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunParams {
    pub(crate) limit: Option<usize>,
}

impl RunParams {
    pub(crate) fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_RUN_LIMIT).min(MAX_RUN_LIMIT)
    }
}

/// Runs the pending batch on the blocking pool; the batch is CPU-bound and parallel.
pub(crate) async fn run_pending_handler<R>(
    State(service): State<Arc<FinancingApplicationService<R>>>,
    Query(params): Query<RunParams>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let limit = params.effective_limit();
    let outcome = tokio::task::spawn_blocking(move || service.run_pending(limit)).await;
    match outcome {
        Ok(Ok(summary)) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            let payload = json!({
                "error": format!("pending run aborted: {join_error}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
