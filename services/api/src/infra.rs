use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use visa_eval::catalog::StaticCatalog;
use visa_eval::config::EngineConfig;
use visa_eval::error::AppError;
use visa_eval::evaluation::academic::AcademicEvaluator;
use visa_eval::evaluation::EvaluationOrchestrator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// A command-line `--catalog` wins over `VISA_CATALOG_PATH`; with neither, the built-in
/// catalog is used.
pub(crate) fn load_catalog(
    engine: &EngineConfig,
    catalog_override: Option<PathBuf>,
) -> Result<StaticCatalog, AppError> {
    match catalog_override.or_else(|| engine.catalog_path.clone()) {
        Some(path) => {
            let catalog = StaticCatalog::from_path(&path)?;
            info!(path = %path.display(), visas = catalog.visa_count(), "catalog loaded from file");
            Ok(catalog)
        }
        None => Ok(StaticCatalog::standard()),
    }
}

pub(crate) fn build_orchestrator(
    engine: &EngineConfig,
    catalog_override: Option<PathBuf>,
) -> Result<Arc<EvaluationOrchestrator>, AppError> {
    let catalog = load_catalog(engine, catalog_override)?;
    let academic = AcademicEvaluator::new(engine.reference_income);
    Ok(Arc::new(EvaluationOrchestrator::new(
        Arc::new(catalog),
        academic,
    )))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
