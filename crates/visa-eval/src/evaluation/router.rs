use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::orchestrator::{ErrorCode, EvaluationOrchestrator, EvaluationRequest};
use super::workflow::Advance;
use crate::catalog::{ApplicationMode, Complexity, ProcessingDays};

/// Router builder exposing the evaluation, batch, catalog, and workflow endpoints.
pub fn evaluation_router(orchestrator: Arc<EvaluationOrchestrator>) -> Router {
    Router::new()
        .route("/api/v1/evaluations", post(evaluate_handler))
        .route("/api/v1/evaluations/batch", post(batch_handler))
        .route("/api/v1/visas", get(visas_handler))
        .route("/api/v1/workflows/advance", post(advance_handler))
        .with_state(orchestrator)
}

pub(crate) async fn evaluate_handler(
    State(orchestrator): State<Arc<EvaluationOrchestrator>>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response {
    let envelope = orchestrator.evaluate(&request);
    let status = match envelope.error.as_ref().map(|failure| failure.code) {
        None => StatusCode::OK,
        Some(ErrorCode::EvaluationFailed) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, axum::Json(envelope)).into_response()
}

pub(crate) async fn batch_handler(
    State(orchestrator): State<Arc<EvaluationOrchestrator>>,
    axum::Json(requests): axum::Json<Vec<EvaluationRequest>>,
) -> Response {
    let report = orchestrator.evaluate_batch(requests);
    (StatusCode::OK, axum::Json(report)).into_response()
}

/// Catalog entry as listed by `GET /api/v1/visas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisaSummary {
    pub code: String,
    pub name: String,
    pub category: String,
    pub supported_modes: Vec<ApplicationMode>,
    pub complexity: Complexity,
    pub processing_days: ProcessingDays,
}

pub fn visa_summaries(orchestrator: &EvaluationOrchestrator) -> Vec<VisaSummary> {
    let catalog = orchestrator.catalog();
    catalog
        .supported_visa_types()
        .iter()
        .filter_map(|code| catalog.visa_config(code))
        .map(|visa| VisaSummary {
            code: visa.code.clone(),
            name: visa.name.clone(),
            category: visa.category.clone(),
            supported_modes: visa.supported_modes.clone(),
            complexity: visa.complexity,
            processing_days: visa.processing_days,
        })
        .collect()
}

pub(crate) async fn visas_handler(
    State(orchestrator): State<Arc<EvaluationOrchestrator>>,
) -> Response {
    (StatusCode::OK, axum::Json(visa_summaries(&orchestrator))).into_response()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdvanceRequest {
    pub template: String,
    pub current_step: String,
    pub action: String,
}

pub(crate) async fn advance_handler(
    State(orchestrator): State<Arc<EvaluationOrchestrator>>,
    axum::Json(request): axum::Json<AdvanceRequest>,
) -> Response {
    let outcome =
        orchestrator
            .planner()
            .advance(&request.template, &request.current_step, &request.action);
    let status = match outcome {
        Advance::Error { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    (status, axum::Json(outcome)).into_response()
}
