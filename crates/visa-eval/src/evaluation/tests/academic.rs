use serde_json::json;

use super::common::*;
use crate::evaluation::academic::{AcademicEvaluator, MANUAL_MINIMUM};
use crate::evaluation::data::ApplicantData;

#[test]
fn established_professor_passes_on_points() {
    let data = ApplicantData::from_value(scenario_a_professor()).expect("object");
    let assessment = AcademicEvaluator::default().assess(&data);

    assert_eq!(assessment.raw_total, 86.0);
    assert_eq!(assessment.normalized_score, 78.18);
    assert!(assessment.eligible);
    assert!(assessment.manual_minimum.met);
    assert_eq!(assessment.manual_minimum.floor, MANUAL_MINIMUM);
    assert_eq!(assessment.roadmap.gap, 0.0);
}

#[test]
fn junior_lecturer_gets_a_roadmap_toward_passing() {
    let data = ApplicantData::from_value(json!({
        "education": "masters",
        "experience_years": 1,
        "publications": 2,
        "age": 30,
        "language": "basic",
        "title": "lecturer",
    }))
    .expect("object");
    let assessment = AcademicEvaluator::default().assess(&data);

    assert!(!assessment.eligible);
    assert!(!assessment.manual_minimum.met);
    assert!(assessment.roadmap.gap > 0.0);
    assert_eq!(assessment.roadmap.phases.len(), 3);
    assert!(!assessment.growth.priority_actions.is_empty());
    assert!(assessment.growth.priority_actions.len() <= 3);
    assert!(assessment.growth.potential_score > assessment.normalized_score);
}

#[test]
fn extension_review_compares_income_with_configured_reference() {
    let data = ApplicantData::from_value(json!({
        "annual_income": 30_000_000,
        "title": "professor",
        "courses_last_year": 2,
        "publications_last_year": 1,
    }))
    .expect("object");

    let strict = AcademicEvaluator::new(60_000_000.0).assess_extension(&data);
    let lenient = AcademicEvaluator::new(20_000_000.0).assess_extension(&data);

    assert!(!strict.income.passed);
    assert!(lenient.income.passed);
    assert!(lenient.score >= strict.score);
}

#[test]
fn academic_new_applications_surface_the_point_breakdown() {
    let envelope = orchestrator().evaluate(&request("E-1", "new", scenario_a_professor()));
    let result = envelope.result.expect("evaluation succeeds");

    assert_eq!(result.details.strategy, "new_application");
    let academic = result.details.academic.expect("academic assessment attached");
    assert_eq!(academic.normalized_score, 78.18);
    assert!(result.score > 0.0);
}

#[test]
fn thin_core_record_fails_the_floor_despite_a_passing_normalized_score() {
    let data = ApplicantData::from_value(json!({
        "education": "doctorate",
        "experience_years": 3,
        "title": "lecturer",
        "publications": 10,
        "language": "native",
        "age": 30,
        "institution_tier": 1,
    }))
    .expect("object");
    let assessment = AcademicEvaluator::default().assess(&data);

    assert_eq!(assessment.raw_total, 79.0);
    assert_eq!(assessment.normalized_score, 71.82);
    assert!(assessment.normalized_score >= assessment.passing_score);
    assert_eq!(assessment.manual_minimum.subtotal, 49.0);
    assert!(!assessment.manual_minimum.met);
    assert!(!assessment.eligible);
}
