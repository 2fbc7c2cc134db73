//! End-to-end evaluation scenarios exercised through the public orchestrator, the HTTP
//! router, and an externally loaded catalog, without reaching into private modules.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use visa_eval::catalog::{CatalogDocument, ConfigurationProvider, StaticCatalog};
use visa_eval::evaluation::academic::AcademicEvaluator;
use visa_eval::evaluation::strategy::AlternativeKind;
use visa_eval::evaluation::workflow::{Advance, TemplateName, WorkflowStep};
use visa_eval::evaluation::{evaluation_router, EvaluationOrchestrator, EvaluationRequest};

fn request(visa_type: &str, mode: &str, data: Value) -> EvaluationRequest {
    EvaluationRequest {
        visa_type: visa_type.to_string(),
        mode: mode.to_string(),
        data,
    }
}

fn professor() -> Value {
    json!({
        "education": "phd",
        "experience_years": 10,
        "publications": 20,
        "age": 45,
        "language": "advanced",
        "documents": [
            {"name": "passport", "verified": true, "apostille": true},
            {"name": "degree_certificate", "verified": true, "apostille": true},
            {"name": "employment_contract", "verified": true, "notarized": true},
            {"name": "career_certificate", "verified": true, "notarized": true},
            {"name": "research_record", "verified": true, "notarized": true}
        ]
    })
}

#[test]
fn eligible_professor_walks_the_filing_workflow() {
    let orchestrator = EvaluationOrchestrator::standard();
    let envelope = orchestrator.evaluate(&request("E-1", "new", professor()));
    let result = envelope.result.expect("evaluation succeeds");

    let academic = result.details.academic.as_ref().expect("academic breakdown");
    assert!(academic.eligible);
    assert!(result.eligible, "score {} below {}", result.score, result.passing_score);
    assert_eq!(result.next_steps.template_name, TemplateName::EligiblePath);

    let planner = orchestrator.planner();
    let mut step = result.next_steps.current_step.id;
    let mut visited = vec![step];
    for action in ["view-report", "upload-documents", "match-lawyer", "pay-now", "submit-application"] {
        match planner.advance(TemplateName::EligiblePath.id(), step.id(), action) {
            Advance::Moved { to, .. } => {
                step = to;
                visited.push(to);
            }
            Advance::Completed { step: done, .. } => {
                assert_eq!(done, WorkflowStep::ApplicationSubmission);
                break;
            }
            other => panic!("unexpected workflow outcome {other:?}"),
        }
    }
    assert_eq!(visited.last(), Some(&WorkflowStep::ApplicationSubmission));
}

#[test]
fn blocked_change_offers_only_the_reapply_route() {
    let orchestrator = EvaluationOrchestrator::standard();
    let envelope = orchestrator.evaluate(&request(
        "E-2",
        "change",
        json!({ "current_visa": "C-4", "reason": "family relocation" }),
    ));
    let result = envelope.result.expect("evaluation succeeds");

    assert!(!result.eligible);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.details.alternatives.len(), 1);
    assert_eq!(
        result.details.alternatives[0].kind,
        AlternativeKind::ExitAndReapply
    );
}

#[test]
fn yaml_catalog_drives_the_same_engine() {
    let yaml = serde_yaml::to_string(&CatalogDocument::standard()).expect("catalog serializes");
    let catalog = StaticCatalog::from_yaml_str(&yaml).expect("catalog reloads");
    assert_eq!(
        catalog.supported_visa_types(),
        StaticCatalog::standard().supported_visa_types()
    );

    let reloaded = EvaluationOrchestrator::new(Arc::new(catalog), AcademicEvaluator::default());
    let builtin = EvaluationOrchestrator::standard();
    let input = request("E-1", "new", professor());

    assert_eq!(
        reloaded.evaluate(&input).result.map(|result| result.score),
        builtin.evaluate(&input).result.map(|result| result.score)
    );
}

#[tokio::test]
async fn router_serves_evaluations_over_http() {
    let router = evaluation_router(Arc::new(EvaluationOrchestrator::standard()));
    let body = json!({ "visa_type": "E-1", "mode": "new", "data": professor() });

    let response = router
        .oneshot(
            Request::post("/api/v1/evaluations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&bytes).expect("json payload");
    assert_eq!(payload["result"]["eligible"], true);
    assert_eq!(payload["result"]["next_steps"]["template_name"], "eligible-path");
}
