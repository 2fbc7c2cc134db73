use std::collections::BTreeMap;

use serde_json::Value;

use super::{RuleCheck, RuleFault, RuleSet, ValidationInput};
use crate::catalog::{ApplicationMode, EducationLevel};
use crate::evaluation::data::as_number;

pub(super) fn mode_templates() -> BTreeMap<ApplicationMode, RuleSet> {
    let mut templates = BTreeMap::new();
    templates.insert(
        ApplicationMode::New,
        RuleSet::new()
            .require("education")
            .require("experience_years")
            .validate("education", education)
            .validate("experience_years", experience_years)
            .validate("age", age),
    );
    templates.insert(
        ApplicationMode::Extension,
        RuleSet::new()
            .require("previous_extensions")
            .require("total_stay_years")
            .validate("previous_extensions", non_negative)
            .validate("total_stay_years", non_negative)
            .validate("contract", active_contract),
    );
    templates.insert(
        ApplicationMode::Change,
        RuleSet::new()
            .require("current_visa")
            .require("reason")
            .validate("current_visa", change_path_legality)
            .validate("reason", stated_reason),
    );
    templates
}

pub(super) fn visa_overrides() -> BTreeMap<String, RuleSet> {
    let mut overrides = BTreeMap::new();
    overrides.insert(
        "F-2-7".to_string(),
        RuleSet::new()
            .require("points_total")
            .validate("points_total", points_total),
    );
    overrides.insert(
        "E-7".to_string(),
        RuleSet::new().require("salary").validate("salary", salary_floor),
    );
    overrides.insert(
        "E-1".to_string(),
        RuleSet::new()
            .require("publications")
            .validate("publications", publication_record),
    );
    overrides.insert(
        "D-2".to_string(),
        RuleSet::new()
            .require("admission_confirmed")
            .validate("admission_confirmed", admission_confirmed),
    );
    overrides
}

/// Ordinal comparison on the ranked education scale.
pub fn meets_education_floor(candidate: EducationLevel, floor: Option<EducationLevel>) -> bool {
    floor.map_or(true, |floor| candidate.meets(floor))
}

fn number(input: &ValidationInput<'_>) -> Result<f64, RuleFault> {
    as_number(input.value).ok_or_else(|| RuleFault::UnexpectedType {
        field: input.field.to_string(),
        expected: "a number",
    })
}

fn text<'a>(input: &'a ValidationInput<'_>) -> Result<&'a str, RuleFault> {
    input
        .value
        .as_str()
        .ok_or_else(|| RuleFault::UnexpectedType {
            field: input.field.to_string(),
            expected: "text",
        })
}

fn education(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let raw = text(input)?;
    let candidate = EducationLevel::parse(raw).ok_or_else(|| RuleFault::Unrecognized {
        field: input.field.to_string(),
        value: raw.to_string(),
    })?;
    let floor = input.context.visa.base_requirements.min_education;

    Ok(match floor {
        Some(required) if !meets_education_floor(candidate, floor) => RuleCheck::fail(format!(
            "{} does not meet the required {}",
            candidate.label(),
            required.label()
        )),
        Some(required) => RuleCheck::pass(format!(
            "{} meets the required {}",
            candidate.label(),
            required.label()
        )),
        None => RuleCheck::pass("no education floor for this visa"),
    })
}

fn experience_years(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let years = number(input)?;
    let minimum = input.context.visa.base_requirements.min_experience_years;
    Ok(if years >= minimum {
        RuleCheck::pass(format!("{years} years of experience (minimum {minimum})"))
    } else {
        RuleCheck::fail(format!(
            "{years} years of experience is below the minimum of {minimum}"
        ))
    })
}

fn age(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let age = number(input)?;
    Ok(match input.context.visa.base_requirements.age_range {
        Some(range) if range.contains(age) => {
            RuleCheck::pass(format!("age {age} within {}-{}", range.min, range.max))
        }
        Some(range) => RuleCheck::fail(format!(
            "age {age} outside the permitted {}-{}",
            range.min, range.max
        )),
        None => RuleCheck::pass("no age restriction for this visa"),
    })
}

fn non_negative(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let value = number(input)?;
    Ok(if value >= 0.0 {
        RuleCheck::pass(format!("{} recorded as {value}", input.field))
    } else {
        RuleCheck::fail(format!("{} cannot be negative", input.field))
    })
}

fn active_contract(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let Value::Object(contract) = input.value else {
        return Err(RuleFault::UnexpectedType {
            field: input.field.to_string(),
            expected: "an object",
        });
    };

    Ok(
        match contract.get("remaining_months").and_then(as_number) {
            Some(months) if months > 0.0 => {
                RuleCheck::pass(format!("{months} months remain on the current contract"))
            }
            Some(_) => RuleCheck::fail("current employment contract has expired"),
            None => RuleCheck::fail("remaining contract term was not provided"),
        },
    )
}

/// Cross-cutting check: the applicant's current visa must have a permitted path to the target.
fn change_path_legality(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let current = text(input)?;
    let target = &input.context.visa_type;
    Ok(match input.catalog.change_path_rule(current, target) {
        Some(rule) if rule.allowed => {
            RuleCheck::pass(format!("change from {current} to {target} is permitted"))
        }
        Some(_) => RuleCheck::fail(format!("change from {current} to {target} is prohibited")),
        None => RuleCheck::fail(format!(
            "no change path is configured from {current} to {target}"
        )),
    })
}

fn stated_reason(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let reason = text(input)?;
    Ok(if reason.trim().is_empty() {
        RuleCheck::fail("a reason for the change must be stated")
    } else {
        RuleCheck::pass("reason for change stated")
    })
}

fn points_total(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let points = number(input)?;
    let minimum = input
        .context
        .visa
        .min_points()
        .ok_or_else(|| RuleFault::MissingReference("special_rules.min_points".to_string()))?;
    Ok(if points >= minimum {
        RuleCheck::pass(format!("{points} points meets the minimum of {minimum}"))
    } else {
        RuleCheck::fail(format!("{points} points is below the minimum of {minimum}"))
    })
}

fn salary_floor(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let salary = number(input)?;
    let minimum = input
        .context
        .visa
        .base_requirements
        .min_salary
        .ok_or_else(|| RuleFault::MissingReference("base_requirements.min_salary".to_string()))?;
    Ok(if salary >= minimum {
        RuleCheck::pass(format!("salary {salary:.0} meets the floor of {minimum:.0}"))
    } else {
        RuleCheck::fail(format!("salary {salary:.0} is below the floor of {minimum:.0}"))
    })
}

fn publication_record(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    let publications = number(input)?;
    Ok(if publications >= 1.0 {
        RuleCheck::pass(format!("{publications} publications on record"))
    } else {
        RuleCheck::fail("at least one publication is required")
    })
}

fn admission_confirmed(input: &ValidationInput<'_>) -> Result<RuleCheck, RuleFault> {
    match input.value {
        Value::Bool(true) => Ok(RuleCheck::pass("admission confirmed by the institution")),
        Value::Bool(false) => Ok(RuleCheck::fail("admission has not been confirmed")),
        _ => Err(RuleFault::UnexpectedType {
            field: input.field.to_string(),
            expected: "true or false",
        }),
    }
}
