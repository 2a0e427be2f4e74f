use crate::cli::ServeArgs;
use crate::infra::{build_engine, AppState, InMemoryApplicationRepository};
use crate::routes::with_financing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use financing_engine::config::AppConfig;
use financing_engine::error::AppError;
use financing_engine::telemetry;
use financing_engine::workflows::financing::FinancingApplicationService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(build_engine(&config.policy, &args.policy)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: engine.clone(),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let application_service = Arc::new(FinancingApplicationService::new(repository, engine));

    let app = with_financing_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "financing decision service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
