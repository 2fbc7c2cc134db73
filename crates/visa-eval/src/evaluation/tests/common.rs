use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::{json, Value};

use crate::catalog::{
    ApplicationMode, ApplicationModeConfig, ConfigurationProvider, StaticCatalog,
};
use crate::evaluation::academic::AcademicEvaluator;
use crate::evaluation::context::{Aggregation, EvaluationContext, ScoreComponent};
use crate::evaluation::data::ApplicantData;
use crate::evaluation::error::EvaluationError;
use crate::evaluation::orchestrator::{EvaluationOrchestrator, EvaluationRequest};
use crate::evaluation::rules::RuleReport;
use crate::evaluation::strategy::{OutcomeDetails, ScoringStrategy, StrategyOutcome};

pub(super) fn orchestrator() -> EvaluationOrchestrator {
    EvaluationOrchestrator::standard()
}

pub(super) fn orchestrator_with(catalog: StaticCatalog) -> EvaluationOrchestrator {
    EvaluationOrchestrator::new(Arc::new(catalog), AcademicEvaluator::default())
}

pub(super) fn request(visa_type: &str, mode: &str, data: Value) -> EvaluationRequest {
    EvaluationRequest {
        visa_type: visa_type.to_string(),
        mode: mode.to_string(),
        data,
    }
}

pub(super) fn context(visa_type: &str, mode: ApplicationMode, data: Value) -> EvaluationContext {
    let catalog = StaticCatalog::standard();
    let visa = catalog.visa_config(visa_type).expect("visa in standard catalog");
    let mode_config = catalog
        .application_mode_config(mode)
        .expect("mode config in standard catalog");
    let data = ApplicantData::from_value(data).expect("object payload");
    EvaluationContext::new("EVAL-TEST", visa, mode_config, data)
}

/// New-mode weights missing `expertise`, so the specialized strategy cannot be built.
pub(super) fn catalog_without_expertise_weight() -> StaticCatalog {
    let mut config = ApplicationModeConfig::standard(ApplicationMode::New);
    config.scoring_weights.remove("expertise");
    StaticCatalog::standard().with_mode_config(config)
}

/// Professor applicant with a strong research record.
pub(super) fn scenario_a_professor() -> Value {
    json!({
        "education": "doctorate",
        "experience_years": 10,
        "publications": 20,
        "age": 45,
        "language": "advanced",
        "documents": [
            "passport",
            "degree_certificate",
            "employment_contract",
            "career_certificate",
            "research_record"
        ]
    })
}

pub(super) fn e7_candidate() -> Value {
    json!({
        "education": "masters",
        "experience_years": 4,
        "salary": 42_000_000,
        "age": 31,
        "certifications": 2,
        "documents": [
            {"name": "passport", "verified": true},
            {"name": "degree_certificate", "verified": true, "apostille": true},
            "employment_contract",
            "career_certificate",
            "business_registration"
        ]
    })
}

/// Always fails, standing in for a strategy that hits an internal error.
pub(super) struct FailingStrategy;

impl ScoringStrategy for FailingStrategy {
    fn mode(&self) -> ApplicationMode {
        ApplicationMode::New
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    fn evaluate(&self, _context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError> {
        Err(EvaluationError::Strategy {
            strategy: "failing",
            message: "scoring backend unavailable".to_string(),
        })
    }
}

/// Reports a passing score its own components do not support.
pub(super) struct InflatedStrategy;

impl ScoringStrategy for InflatedStrategy {
    fn mode(&self) -> ApplicationMode {
        ApplicationMode::New
    }

    fn name(&self) -> &'static str {
        "inflated"
    }

    fn evaluate(&self, _context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError> {
        let mut details =
            OutcomeDetails::new(self.name(), Aggregation::Weighted, RuleReport::default());
        details.components = vec![
            ScoreComponent::new("eligibility", 40.0, 60.0, "partial"),
            ScoreComponent::new("documents", 25.0, 40.0, "partial"),
        ];
        Ok(StrategyOutcome {
            details,
            recommendations: Vec::new(),
            required_documents: Vec::new(),
            final_score: 99.0,
        })
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
