use crate::cli::ServeArgs;
use crate::infra::{build_orchestrator, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use visa_eval::catalog::ConfigurationProvider;
use visa_eval::config::AppConfig;
use visa_eval::error::AppError;
use visa_eval::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let orchestrator = build_orchestrator(&config.engine, args.catalog.take())?;
    let visa_types = orchestrator.catalog().supported_visa_types().len();

    let app = with_service_routes(orchestrator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        visa_types,
        reference_income = config.engine.reference_income,
        "visa evaluation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
