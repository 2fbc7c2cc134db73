use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::catalog::{ApplicationMode, StaticCatalog};
use crate::evaluation::orchestrator::{new_evaluation_id, ErrorCode, EvaluationOrchestrator};

#[test]
fn evaluation_ids_carry_prefix_and_suffix() {
    let id = new_evaluation_id();
    let parts: Vec<&str> = id.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "EVAL");
    assert!(parts[1].parse::<i64>().is_ok());
    assert_eq!(parts[2].len(), 8);
    assert_ne!(new_evaluation_id(), id);
}

#[test]
fn validation_failures_use_stable_codes() {
    let orchestrator = orchestrator();
    let cases = [
        (request("Z-9", "new", json!({})), ErrorCode::InvalidVisaType),
        (request("E-7", "upgrade", json!({})), ErrorCode::InvalidMode),
        (request("D-2", "change", json!({})), ErrorCode::UnsupportedMode),
        (request("E-7", "new", json!(["education"])), ErrorCode::InvalidData),
    ];

    for (input, expected) in cases {
        let envelope = orchestrator.evaluate(&input);
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
        let failure = envelope.error.expect("failure attached");
        assert_eq!(failure.code, expected, "{input:?}");
        assert!(failure.code.is_validation());
    }
}

#[test]
fn missing_mode_configuration_is_reported() {
    let catalog = StaticCatalog::standard().without_mode_config(ApplicationMode::Extension);
    let envelope = orchestrator_with(catalog).evaluate(&request(
        "E-7",
        "extension",
        json!({ "previous_extensions": 0 }),
    ));
    let failure = envelope.error.expect("failure attached");
    assert_eq!(failure.code, ErrorCode::ConfigurationMissing);
}

#[test]
fn visa_codes_and_modes_are_normalized() {
    let envelope = orchestrator().evaluate(&request(" e-7 ", "New", e7_candidate()));
    assert!(envelope.success);
    assert_eq!(envelope.metadata.visa_type, " e-7 ");
    assert_eq!(envelope.metadata.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn strategy_errors_become_evaluation_failures() {
    let orchestrator = orchestrator().with_strategy(Arc::new(FailingStrategy));
    let envelope = orchestrator.evaluate(&request("E-7", "new", e7_candidate()));

    assert!(!envelope.success);
    let failure = envelope.error.expect("failure attached");
    assert_eq!(failure.code, ErrorCode::EvaluationFailed);
    assert!(!failure.code.is_validation());
    assert!(failure.message.contains("scoring backend unavailable"));
    assert_eq!(failure.details["strategy"], "failing");
}

#[test]
fn final_score_is_recomputed_from_reported_components() {
    let orchestrator = orchestrator().with_strategy(Arc::new(InflatedStrategy));
    let envelope = orchestrator.evaluate(&request("E-7", "new", e7_candidate()));
    let result = envelope.result.expect("evaluation succeeds");

    assert_eq!(result.details.strategy, "inflated");
    // 40 * 0.6 + 25 * 0.4
    assert_eq!(result.score, 34.0);
    assert!(!result.eligible);
}

#[test]
fn repeated_evaluations_agree() {
    let orchestrator = orchestrator();
    let input = request("E-1", "new", scenario_a_professor());

    let first = orchestrator.evaluate(&input);
    let second = orchestrator.evaluate(&input);

    assert_ne!(first.evaluation_id, second.evaluation_id);
    assert_eq!(first.result, second.result);
}

#[test]
fn eligibility_follows_the_mode_passing_score() {
    let envelope = orchestrator().evaluate(&request("E-7", "new", e7_candidate()));
    let result = envelope.result.expect("evaluation succeeds");

    assert_eq!(result.passing_score, 70.0);
    assert_eq!(result.eligible, result.score >= result.passing_score);
    assert!((0.0..=100.0).contains(&result.score));
}

#[test]
fn processing_window_scales_with_complexity() {
    let envelope = orchestrator().evaluate(&request("E-7", "new", e7_candidate()));
    let result = envelope.result.expect("evaluation succeeds");
    let window = result.processing_time;

    assert_eq!(window.multiplier, result.complexity.multiplier());
    assert_eq!(window.min_days, (30.0 * window.multiplier).round() as u32);
    assert_eq!(window.max_days, (90.0 * window.multiplier).round() as u32);
}

#[test]
fn change_mode_promotes_complexity() {
    let orchestrator = orchestrator();
    let new = orchestrator
        .evaluate(&request("E-2", "new", json!({ "education": "bachelor" })))
        .result
        .expect("new evaluates");
    let change = orchestrator
        .evaluate(&request(
            "E-2",
            "change",
            json!({ "current_visa": "C-4", "reason": "teaching offer" }),
        ))
        .result
        .expect("change evaluates");

    assert_eq!(change.complexity, new.complexity.promoted());
}

#[test]
fn batch_items_are_isolated() {
    let orchestrator = EvaluationOrchestrator::standard();
    let report = orchestrator.evaluate_batch(vec![
        request("E-7", "new", e7_candidate()),
        request("Z-9", "new", json!({})),
        request("E-1", "new", scenario_a_professor()),
    ]);

    assert_eq!(report.total, 3);
    assert_eq!(report.successful, 2);
    assert_eq!(report.failed, 1);
    assert!(report.results[0].success);
    assert_eq!(
        report.results[1].error.as_ref().map(|failure| failure.code),
        Some(ErrorCode::InvalidVisaType)
    );
    assert!(report.results[2].success);
    assert_eq!(report.results[1].input.visa_type, "Z-9");
}

#[test]
fn empty_batches_report_zero_counts() {
    let report = orchestrator().evaluate_batch(Vec::new());
    assert_eq!((report.total, report.successful, report.failed), (0, 0, 0));
}
