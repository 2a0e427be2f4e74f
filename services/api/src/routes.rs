use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use financing_engine::error::AppError;
use financing_engine::workflows::financing::{
    financing_router, ApplicationRepository, EngineConfig, FinancingApplicationService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_financing_routes<R>(
    service: Arc<FinancingApplicationService<R>>,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
{
    financing_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/financing/policy", axum::routing::get(policy_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Active policy document, so operators can diff it against the one they deployed.
pub(crate) async fn policy_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<EngineConfig>, AppError> {
    Ok(Json(state.engine.config().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use financing_engine::workflows::financing::FinancingEngine;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            engine: Arc::new(FinancingEngine::standard().expect("standard policy compiles")),
        }
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = readiness_endpoint(Extension(state(false))).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(state(true))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn policy_endpoint_returns_active_policy() {
        let Json(policy) = policy_endpoint(Extension(state(true)))
            .await
            .expect("policy served");
        assert_eq!(policy, EngineConfig::standard());
    }
}
