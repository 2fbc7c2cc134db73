//! Scoring helpers shared by every strategy.

use serde_json::Value;

use super::StrategyDependencies;
use crate::catalog::{ApplicationMode, ApplicationModeConfig, VisaConfig};
use crate::evaluation::context::{round2, EvaluationContext, Priority, ScoreSheet};
use crate::evaluation::data::ApplicantData;
use crate::evaluation::error::{EvaluationError, StrategyInitError};

/// Confirms the catalog carries a mode config with every named weight.
pub(super) fn require_weights(
    dependencies: &StrategyDependencies,
    mode: ApplicationMode,
    components: &[&'static str],
) -> Result<(), StrategyInitError> {
    let config = dependencies
        .catalog
        .application_mode_config(mode)
        .ok_or(StrategyInitError::MissingModeConfig(mode))?;
    for &component in components {
        if config.weight(component).is_none() {
            return Err(StrategyInitError::MissingWeight {
                mode,
                component,
            });
        }
    }
    Ok(())
}

pub(super) fn weight(
    config: &ApplicationModeConfig,
    component: &'static str,
) -> Result<f64, EvaluationError> {
    config
        .weight(component)
        .ok_or(EvaluationError::MissingWeight {
            mode: config.mode,
            component,
        })
}

/// First band whose threshold `value` reaches; tables are ordered highest first.
pub(super) fn band(value: f64, table: &[(f64, f64)], fallback: f64) -> f64 {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct DocumentAssessment {
    pub score: f64,
    pub completeness: f64,
    pub authenticity: f64,
    pub missing: Vec<String>,
}

impl DocumentAssessment {
    pub fn details(&self) -> String {
        format!(
            "completeness {:.0}%, authenticity {:.0}%",
            self.completeness, self.authenticity
        )
    }
}

/// Completeness of the required set (present and verified each count half) blended 70/30
/// with the mean authenticity of what was submitted.
pub(super) fn assess_documents(required: &[String], data: &ApplicantData) -> DocumentAssessment {
    let submitted = data.documents();
    let mut credits = 0u32;
    let mut missing = Vec::new();

    for name in required {
        let wanted = crate::evaluation::data::normalize_document_name(name);
        match submitted.iter().find(|document| document.name == wanted) {
            Some(document) => {
                credits += 1;
                if document.verified {
                    credits += 1;
                }
            }
            None => missing.push(name.clone()),
        }
    }

    let completeness = if required.is_empty() {
        100.0
    } else {
        credits as f64 / (required.len() * 2) as f64 * 100.0
    };

    let authenticity = if submitted.is_empty() {
        if required.is_empty() {
            100.0
        } else {
            0.0
        }
    } else {
        let total: f64 = submitted
            .iter()
            .map(|document| {
                let mut score = 40.0;
                if document.apostille {
                    score += 30.0;
                }
                if document.notarized {
                    score += 20.0;
                }
                if document.verified {
                    score += 10.0;
                }
                f64::min(score, 100.0)
            })
            .sum();
        total / submitted.len() as f64
    };

    DocumentAssessment {
        score: round2(completeness * 0.7 + authenticity * 0.3),
        completeness: round2(completeness),
        authenticity: round2(authenticity),
        missing,
    }
}

/// Records the document assessment on the sheet and returns its score.
pub(super) fn score_documents(
    sheet: &mut ScoreSheet,
    required: &[String],
    data: &ApplicantData,
) -> DocumentAssessment {
    let assessment = assess_documents(required, data);
    sheet.require_documents(required);
    for name in &assessment.missing {
        sheet.recommend(
            Priority::High,
            "documents",
            format!("Submit the required document: {name}"),
        );
    }
    if assessment.authenticity < 70.0 && !data.documents().is_empty() {
        sheet.recommend(
            Priority::Low,
            "documents",
            "Apostille or notarize foreign documents to strengthen authenticity",
        );
    }
    sheet.validate(
        "documents",
        assessment.missing.is_empty(),
        if assessment.missing.is_empty() {
            "all required documents submitted".to_string()
        } else {
            format!("{} required documents missing", assessment.missing.len())
        },
    );
    assessment
}

const VIOLATION_PENALTIES: [(&str, f64); 5] = [
    ("overstay", 30.0),
    ("illegal_employment", 40.0),
    ("criminal", 50.0),
    ("unreported_change", 10.0),
    ("late_registration", 10.0),
];
const OTHER_VIOLATION_PENALTY: f64 = 15.0;
const TAX_BONUS: f64 = 10.0;
const LOW_DEPARTURE_BONUS: f64 = 5.0;
const LOW_DEPARTURES_PER_YEAR: f64 = 3.0;

pub(super) fn violation_penalty(kind: &str) -> f64 {
    let kind = kind.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    VIOLATION_PENALTIES
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, penalty)| *penalty)
        .unwrap_or(OTHER_VIOLATION_PENALTY)
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct StayHistory {
    pub score: f64,
    pub violations: Vec<String>,
}

/// 100 minus per-violation penalties, plus the tax and departure bonuses, clamped.
pub(super) fn assess_stay_history(data: &ApplicantData) -> StayHistory {
    let listed = match data.list_at(&["stay_history", "violations"]) {
        [] => data.list_at(&["violations"]),
        listed => listed,
    };
    let violations: Vec<String> = listed
        .iter()
        .filter_map(|entry| match entry {
            Value::String(kind) => Some(kind.clone()),
            Value::Object(fields) => fields
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect();

    let mut score = 100.0;
    for kind in &violations {
        score -= violation_penalty(kind);
    }
    if data.flag_at(&["stay_history", "consistent_tax_payment"]) || data.flag("consistent_tax_payment") {
        score += TAX_BONUS;
    }
    let departures = data
        .number_at(&["stay_history", "departures_per_year"])
        .or_else(|| data.number("departures_per_year"));
    if departures.is_some_and(|departures| departures <= LOW_DEPARTURES_PER_YEAR) {
        score += LOW_DEPARTURE_BONUS;
    }

    StayHistory {
        score: f64::clamp(score, 0.0, 100.0),
        violations,
    }
}

pub(super) fn score_stay_history(sheet: &mut ScoreSheet, data: &ApplicantData) -> StayHistory {
    let history = assess_stay_history(data);
    sheet.validate(
        "stay_history",
        history.violations.is_empty(),
        if history.violations.is_empty() {
            "no immigration violations on record".to_string()
        } else {
            format!("violations on record: {}", history.violations.join(", "))
        },
    );
    if !history.violations.is_empty() {
        sheet.recommend(
            Priority::High,
            "stay_history",
            "Prepare a written explanation for each recorded violation",
        );
    }
    history
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct EligibilityAssessment {
    pub score: f64,
    pub checks: usize,
    pub met: usize,
}

/// Mean of the education check, the experience ratio, and the age check when one applies.
pub(super) fn assess_eligibility(
    sheet: &mut ScoreSheet,
    visa: &VisaConfig,
    data: &ApplicantData,
) -> EligibilityAssessment {
    let requirements = &visa.base_requirements;
    let mut scores = Vec::with_capacity(3);

    let education = match (requirements.min_education, data.education()) {
        (None, _) => {
            sheet.validate("education", true, "no education floor");
            100.0
        }
        (Some(floor), Some(level)) if level.meets(floor) => {
            sheet.validate(
                "education",
                true,
                format!("{} meets the required {}", level.label(), floor.label()),
            );
            100.0
        }
        (Some(floor), held) => {
            let message = match held {
                Some(level) => format!("{} is below the required {}", level.label(), floor.label()),
                None => format!("education not provided; {} required", floor.label()),
            };
            sheet.validate("education", false, message);
            sheet.recommend(
                Priority::High,
                "eligibility",
                format!("Obtain at least a {} for {}", floor.label(), visa.code),
            );
            0.0
        }
    };
    scores.push(education);

    let minimum = requirements.min_experience_years;
    let years = data
        .number("experience_years")
        .or_else(|| data.number("experience"))
        .unwrap_or(0.0)
        .max(0.0);
    let experience = if minimum <= 0.0 {
        100.0
    } else {
        (years / minimum).min(1.0) * 100.0
    };
    sheet.validate(
        "experience_years",
        years >= minimum,
        format!("{years} of {minimum} required years of experience"),
    );
    if years < minimum {
        sheet.recommend(
            Priority::Medium,
            "eligibility",
            format!(
                "Gain {} more years of relevant experience",
                round2(minimum - years)
            ),
        );
    }
    scores.push(experience);

    if let (Some(range), Some(age)) = (requirements.age_range, data.number("age")) {
        let within = range.contains(age);
        sheet.validate(
            "age",
            within,
            format!("age {age} against the permitted {}-{}", range.min, range.max),
        );
        scores.push(if within { 100.0 } else { 0.0 });
    }

    let met = scores.iter().filter(|score| **score >= 100.0).count();
    EligibilityAssessment {
        score: round2(scores.iter().sum::<f64>() / scores.len() as f64),
        checks: scores.len(),
        met,
    }
}

/// Reads the rule report into recommendations, failed rules first.
pub(super) fn recommend_from_rules(
    sheet: &mut ScoreSheet,
    report: &crate::evaluation::rules::RuleReport,
) {
    for entry in &report.failed {
        sheet.recommend(Priority::High, "requirements", entry.message.clone());
    }
    for entry in &report.warnings {
        sheet.recommend(
            Priority::Low,
            "data_quality",
            format!("Check the `{}` field: {}", entry.field, entry.message),
        );
    }
}

/// Convenience for strategies that only need the context's mode config.
pub(super) fn context_weight(
    context: &EvaluationContext,
    component: &'static str,
) -> Result<f64, EvaluationError> {
    weight(&context.mode_config, component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> ApplicantData {
        ApplicantData::from_value(value).expect("object")
    }

    #[test]
    fn documents_blend_completeness_and_authenticity() {
        let required = vec!["passport".to_string(), "diploma".to_string()];
        let assessment = assess_documents(
            &required,
            &data(json!({
                "documents": [
                    { "name": "passport", "verified": true },
                    { "name": "diploma", "apostille": true, "notarized": true },
                ]
            })),
        );
        // completeness 3/4, authenticity (50 + 90) / 2
        assert_eq!(assessment.completeness, 75.0);
        assert_eq!(assessment.authenticity, 70.0);
        assert_eq!(assessment.score, 73.5);
        assert!(assessment.missing.is_empty());
    }

    #[test]
    fn nothing_required_scores_full_marks() {
        let assessment = assess_documents(&[], &data(json!({})));
        assert_eq!(assessment.score, 100.0);
    }

    #[test]
    fn stay_history_applies_penalties_and_bonuses() {
        let history = assess_stay_history(&data(json!({
            "stay_history": {
                "violations": ["overstay", { "type": "late-registration" }, "parking"],
                "consistent_tax_payment": true,
                "departures_per_year": 2,
            }
        })));
        // 100 - 30 - 10 - 15 + 10 + 5
        assert_eq!(history.score, 60.0);
        assert_eq!(history.violations.len(), 3);
    }

    #[test]
    fn band_falls_back_below_lowest_threshold() {
        let table = [(4.0, 30.0), (2.0, 20.0), (1.0, 10.0)];
        assert_eq!(band(5.0, &table, 0.0), 30.0);
        assert_eq!(band(2.0, &table, 0.0), 20.0);
        assert_eq!(band(0.0, &table, 0.0), 0.0);
    }
}
