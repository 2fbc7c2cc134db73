use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use super::common::*;
use crate::catalog::{ApplicationMode, ConfigurationProvider, EducationLevel, StaticCatalog};
use crate::evaluation::context::EvaluationContext;
use crate::evaluation::data::ApplicantData;
use crate::evaluation::rules::{RuleEvaluator, RuleSet};

fn evaluator() -> RuleEvaluator {
    RuleEvaluator::new(Arc::new(StaticCatalog::standard()))
}

fn education_level() -> impl Strategy<Value = EducationLevel> {
    (0usize..5).prop_map(|index| EducationLevel::ordered()[index])
}

proptest! {
    #[test]
    fn education_ordering_is_transitive(
        a in education_level(),
        b in education_level(),
        c in education_level(),
    ) {
        if a.meets(b) && b.meets(c) {
            prop_assert!(a.meets(c));
        }
        prop_assert!(a.meets(a));
    }
}

#[test]
fn missing_required_fields_fail() {
    let report = evaluator().apply(&context(
        "E-2",
        ApplicationMode::New,
        json!({ "education": "bachelor" }),
    ));

    assert!(report
        .failed
        .iter()
        .any(|entry| entry.field == "experience_years"));
    assert!(report.passed.iter().any(|entry| entry.field == "education"));
}

#[test]
fn unreadable_values_become_warnings() {
    let report = evaluator().apply(&context(
        "E-7",
        ApplicationMode::New,
        json!({
            "education": "apprenticeship",
            "experience_years": "several",
            "salary": 40_000_000,
        }),
    ));

    let warned: Vec<&str> = report.warnings.iter().map(|entry| entry.field.as_str()).collect();
    assert!(warned.contains(&"education"));
    assert!(warned.contains(&"experience_years"));
    assert!(report.failed.iter().all(|entry| entry.field != "education"));
    assert!(report.passed.iter().any(|entry| entry.field == "salary"));
}

#[test]
fn visa_overrides_extend_the_mode_template() {
    let rules = evaluator().rule_set(ApplicationMode::New, " d-2 ");
    assert!(rules.required_fields().iter().any(|field| field == "education"));
    assert!(rules
        .required_fields()
        .iter()
        .any(|field| field == "admission_confirmed"));
}

#[test]
fn injected_override_replaces_the_builtin_one() {
    let evaluator = evaluator().with_override("E-7", RuleSet::new().require("job_offer"));
    let report = evaluator.apply(&context(
        "E-7",
        ApplicationMode::New,
        json!({ "education": "masters", "experience_years": 3 }),
    ));

    assert!(report.failed.iter().any(|entry| entry.field == "job_offer"));
    assert!(report.failed.iter().all(|entry| entry.field != "salary"));
}

#[test]
fn missing_reference_values_warn_instead_of_failing() {
    let catalog = StaticCatalog::standard();
    let mut visa = (*catalog.visa_config("F-2-7").expect("F-2-7 present")).clone();
    visa.special_rules = None;
    let catalog = Arc::new(catalog.with_visa(visa));

    let visa = catalog.visa_config("F-2-7").expect("F-2-7 present");
    let mode_config = catalog
        .application_mode_config(ApplicationMode::New)
        .expect("new mode configured");
    let data = ApplicantData::from_value(json!({
        "education": "bachelor",
        "experience_years": 2,
        "points_total": 90,
    }))
    .expect("object");
    let context = EvaluationContext::new("EVAL-TEST", visa, mode_config, data);

    let report = RuleEvaluator::new(catalog).apply(&context);
    assert!(report
        .warnings
        .iter()
        .any(|entry| entry.field == "points_total"));
    assert_eq!(report.score, 100.0);
}

#[test]
fn change_rules_check_the_path_against_the_catalog() {
    let report = evaluator().apply(&context(
        "E-2",
        ApplicationMode::Change,
        json!({ "current_visa": "C-4", "reason": "new job offer" }),
    ));

    let path = report
        .failed
        .iter()
        .find(|entry| entry.field == "current_visa")
        .expect("path check failed");
    assert!(path.message.contains("no change path"));
}
