use std::sync::Arc;

use serde::Serialize;

use super::base::{
    band, context_weight, recommend_from_rules, require_weights, score_stay_history,
};
use super::{OutcomeDetails, ScoringStrategy, StrategyDependencies, StrategyOutcome};
use crate::catalog::{ApplicationMode, ExtensionLimit, ScoringProfile};
use crate::evaluation::academic::AcademicEvaluator;
use crate::evaluation::context::{
    round2, Aggregation, EvaluationContext, Priority, ScoreComponent, ScoreSheet,
};
use crate::evaluation::data::ApplicantData;
use crate::evaluation::error::{EvaluationError, StrategyInitError};
use crate::evaluation::rules::RuleEvaluator;

const WEIGHTS: [&str; 4] = ["stay_history", "performance", "contract", "documents"];

/// Ceiling applied when a visa carries no extension limit of its own.
pub const DEFAULT_EXTENSION_LIMIT: ExtensionLimit = ExtensionLimit {
    max_extensions: 3,
    max_stay_years: 5.0,
};

/// Fixed checklist worth 100 points in total.
const DOCUMENT_CHECKLIST: [(&str, f64); 6] = [
    ("passport", 20.0),
    ("alien_registration_card", 20.0),
    ("employment_contract", 25.0),
    ("tax_certificate", 15.0),
    ("residence_proof", 10.0),
    ("health_insurance", 10.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionLimitCheck {
    pub allowed: bool,
    pub previous_extensions: u32,
    pub max_extensions: u32,
    pub remaining_extensions: u32,
    pub total_stay_years: f64,
    pub max_stay_years: f64,
    pub remaining_years: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn check_extension_limit(
    limit: ExtensionLimit,
    previous_extensions: u32,
    total_stay_years: f64,
) -> ExtensionLimitCheck {
    let count_reached = previous_extensions >= limit.max_extensions;
    let stay_reached = total_stay_years >= limit.max_stay_years;

    let reason = match (count_reached, stay_reached) {
        (true, _) => Some(format!(
            "{previous_extensions} extensions already granted; the limit is {}",
            limit.max_extensions
        )),
        (false, true) => Some(format!(
            "{total_stay_years} years of cumulative stay reaches the limit of {}",
            limit.max_stay_years
        )),
        (false, false) => None,
    };

    ExtensionLimitCheck {
        allowed: reason.is_none(),
        previous_extensions,
        max_extensions: limit.max_extensions,
        remaining_extensions: limit.max_extensions.saturating_sub(previous_extensions),
        total_stay_years,
        max_stay_years: limit.max_stay_years,
        remaining_years: round2((limit.max_stay_years - total_stay_years).max(0.0)),
        reason,
    }
}

/// Absolute-point scoring for stay extensions.
pub(super) struct ExtensionStrategy {
    rules: Arc<RuleEvaluator>,
    academic: Arc<AcademicEvaluator>,
}

impl ExtensionStrategy {
    pub fn new(dependencies: &StrategyDependencies) -> Result<Self, StrategyInitError> {
        require_weights(dependencies, ApplicationMode::Extension, &WEIGHTS)?;
        Ok(Self {
            rules: dependencies.rules.clone(),
            academic: dependencies.academic.clone(),
        })
    }
}

impl ScoringStrategy for ExtensionStrategy {
    fn mode(&self) -> ApplicationMode {
        ApplicationMode::Extension
    }

    fn name(&self) -> &'static str {
        "extension"
    }

    fn evaluate(&self, context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError> {
        let report = self.rules.apply(context);
        let mut sheet = ScoreSheet::default();
        recommend_from_rules(&mut sheet, &report);
        let mut details = OutcomeDetails::new(self.name(), Aggregation::AbsolutePoints, report);
        let data = &context.data;

        let history = score_stay_history(&mut sheet, data);
        sheet.component(ScoreComponent::new(
            "stay_history",
            history.score,
            context_weight(context, "stay_history")?,
            format!("{} violations on record", history.violations.len()),
        ));

        let (activity, note) = activity_score(context.visa.profile, data);
        if activity < 50.0 {
            sheet.recommend(
                Priority::Medium,
                "performance",
                "Document recent work or study activity to strengthen the performance record",
            );
        }
        sheet.component(ScoreComponent::new(
            "performance",
            activity,
            context_weight(context, "performance")?,
            note,
        ));

        let contract = contract_continuity(data);
        if contract < 60.0 {
            sheet.recommend(
                Priority::High,
                "contract",
                "Secure a continuous employment contract before filing",
            );
        }
        sheet.component(ScoreComponent::new(
            "contract",
            contract,
            context_weight(context, "contract")?,
            "contract continuity after deltas",
        ));

        let checklist = document_checklist(&mut sheet, data);
        sheet.component(ScoreComponent::new(
            "documents",
            checklist,
            context_weight(context, "documents")?,
            "extension document checklist",
        ));

        if context.visa.profile == ScoringProfile::Academic {
            let review = self.academic.assess_extension(data);
            for check in [&review.income, &review.tax_compliance, &review.recent_activity] {
                if !check.passed {
                    sheet.recommend(Priority::Medium, "academic", check.details.clone());
                }
            }
            details.academic_extension = Some(review);
        }

        let limit = context.visa.extension_limit().unwrap_or(DEFAULT_EXTENSION_LIMIT);
        let previous = data
            .number("previous_extensions")
            .unwrap_or(0.0)
            .max(0.0)
            .round() as u32;
        let total_years = data.number("total_stay_years").unwrap_or(0.0).max(0.0);
        let check = check_extension_limit(limit, previous, total_years);
        sheet.validate(
            "extension_limit",
            check.allowed,
            check
                .reason
                .clone()
                .unwrap_or_else(|| format!("{} extensions remain", check.remaining_extensions)),
        );
        if let Some(reason) = &check.reason {
            details.blocked = true;
            details.block_reason = Some(reason.clone());
            sheet.recommend(
                Priority::High,
                "extension_limit",
                "Consider changing to a visa category that permits a longer stay",
            );
        }
        details.extension_limit = Some(check);

        Ok(StrategyOutcome::finish(details, sheet))
    }
}

type BandTable = &'static [(f64, f64)];

/// `(field, bands, fallback)` per profile; every profile's bands top out at 100 in total.
const ACADEMIC_ACTIVITY: [(&str, BandTable, f64); 4] = [
    ("courses_taught", &[(4.0, 30.0), (2.0, 20.0), (1.0, 10.0)], 0.0),
    ("publications", &[(3.0, 30.0), (1.0, 20.0)], 5.0),
    ("supervised_students", &[(5.0, 20.0), (1.0, 10.0)], 0.0),
    ("attendance_rate", &[(0.95, 20.0), (0.85, 15.0), (0.7, 5.0)], 0.0),
];
const INSTRUCTOR_ACTIVITY: [(&str, BandTable, f64); 3] = [
    ("teaching_hours", &[(15.0, 40.0), (10.0, 30.0), (5.0, 15.0)], 0.0),
    ("student_rating", &[(4.5, 30.0), (4.0, 20.0), (3.0, 10.0)], 0.0),
    ("attendance_rate", &[(0.95, 30.0), (0.85, 20.0), (0.7, 10.0)], 0.0),
];
const STUDENT_ACTIVITY: [(&str, BandTable, f64); 3] = [
    ("attendance_rate", &[(0.9, 40.0), (0.8, 30.0), (0.7, 15.0)], 0.0),
    ("gpa", &[(3.5, 40.0), (3.0, 30.0), (2.0, 15.0)], 0.0),
    ("credits", &[(15.0, 20.0), (9.0, 10.0)], 0.0),
];
const PROFESSIONAL_ACTIVITY: [(&str, BandTable, f64); 3] = [
    ("performance_rating", &[(4.5, 50.0), (4.0, 40.0), (3.0, 25.0)], 10.0),
    ("projects_completed", &[(5.0, 30.0), (2.0, 20.0), (1.0, 10.0)], 0.0),
    ("attendance_rate", &[(0.95, 20.0), (0.85, 15.0), (0.7, 5.0)], 0.0),
];

fn activity_score(profile: ScoringProfile, data: &ApplicantData) -> (f64, String) {
    let table: &[(&str, BandTable, f64)] = match profile {
        ScoringProfile::Academic => &ACADEMIC_ACTIVITY,
        ScoringProfile::Instructor => &INSTRUCTOR_ACTIVITY,
        ScoringProfile::Student => &STUDENT_ACTIVITY,
        _ => &PROFESSIONAL_ACTIVITY,
    };

    let mut score = 0.0;
    let mut seen = Vec::new();
    for &(field, bands, fallback) in table {
        let value = data
            .number_at(&["activity", field])
            .or_else(|| data.number(field));
        if value.is_some() {
            seen.push(field);
        }
        // attendance may arrive as a percentage
        let value = match value {
            Some(rate) if field == "attendance_rate" && rate > 1.0 => rate / 100.0,
            Some(value) => value,
            None => 0.0,
        };
        score += band(value, bands, fallback);
    }

    let note = if seen.is_empty() {
        "no activity metrics provided".to_string()
    } else {
        format!("scored on {}", seen.join(", "))
    };
    (f64::min(score, 100.0), note)
}

/// Starts at 100 and applies signed deltas; fields that were not provided apply none.
pub(super) fn contract_continuity(data: &ApplicantData) -> f64 {
    let field = |name: &str| data.number_at(&["contract", name]);
    let mut score = 100.0;

    if let Some(months) = field("remaining_months") {
        score += if months >= 12.0 {
            0.0
        } else if months >= 6.0 {
            -5.0
        } else if months >= 3.0 {
            -10.0
        } else {
            -15.0
        };
    }
    if let Some(changes) = field("employer_changes") {
        score += if changes <= 0.0 {
            0.0
        } else if changes < 2.0 {
            -5.0
        } else if changes < 3.0 {
            -10.0
        } else {
            -20.0
        };
    }
    if let Some(gap) = field("gap_days") {
        score += if gap <= 0.0 {
            0.0
        } else if gap <= 30.0 {
            -5.0
        } else if gap <= 90.0 {
            -15.0
        } else {
            -25.0
        };
    }
    match data
        .text_at(&["contract", "salary_trend"])
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("increasing") => score += 5.0,
        Some("decreasing") => score -= 10.0,
        _ => {}
    }
    if let Some(tenure) = field("tenure_months") {
        score += band(tenure, &[(36.0, 10.0), (12.0, 5.0)], 0.0);
    }

    f64::clamp(score, 0.0, 100.0)
}

fn document_checklist(sheet: &mut ScoreSheet, data: &ApplicantData) -> f64 {
    let mut total = 0.0;
    let mut missing = Vec::new();
    for (name, points) in DOCUMENT_CHECKLIST {
        if data.has_document(name) {
            total += points;
        } else {
            missing.push(name.to_string());
        }
    }
    for name in &missing {
        sheet.recommend(
            Priority::Medium,
            "documents",
            format!("Prepare the {} for the extension filing", name.replace('_', " ")),
        );
    }
    sheet.require_documents(&missing);
    total
}
