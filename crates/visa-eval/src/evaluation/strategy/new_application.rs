use std::sync::Arc;

use super::base::{
    assess_eligibility, context_weight, recommend_from_rules, require_weights, score_documents,
};
use super::{OutcomeDetails, ScoringStrategy, StrategyDependencies, StrategyOutcome};
use crate::catalog::{ApplicationMode, ScoringProfile, VisaConfig};
use crate::evaluation::academic::{AcademicAssessment, AcademicEvaluator};
use crate::evaluation::context::{
    round2, Aggregation, EvaluationContext, Priority, ScoreComponent, ScoreSheet,
};
use crate::evaluation::data::ApplicantData;
use crate::evaluation::error::{EvaluationError, StrategyInitError};
use crate::evaluation::rules::RuleEvaluator;

const WEIGHTS: [&str; 3] = ["eligibility", "documents", "expertise"];
const DEFAULT_MIN_POINTS: f64 = 80.0;
const POINTS_HEADROOM: f64 = 1.25;
const TARGET_CERTIFICATES: f64 = 3.0;
const UNKNOWN_SALARY_RATIO: f64 = 0.5;

/// Scores first-time applications: eligibility, documents, and expertise.
pub(super) struct NewApplicationStrategy {
    rules: Arc<RuleEvaluator>,
    academic: Arc<AcademicEvaluator>,
}

impl NewApplicationStrategy {
    pub fn new(dependencies: &StrategyDependencies) -> Result<Self, StrategyInitError> {
        require_weights(dependencies, ApplicationMode::New, &WEIGHTS)?;
        Ok(Self {
            rules: dependencies.rules.clone(),
            academic: dependencies.academic.clone(),
        })
    }
}

impl ScoringStrategy for NewApplicationStrategy {
    fn mode(&self) -> ApplicationMode {
        ApplicationMode::New
    }

    fn name(&self) -> &'static str {
        "new_application"
    }

    fn evaluate(&self, context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError> {
        let report = self.rules.apply(context);
        let mut sheet = ScoreSheet::default();
        recommend_from_rules(&mut sheet, &report);
        let mut details = OutcomeDetails::new(self.name(), Aggregation::Weighted, report);

        let eligibility = assess_eligibility(&mut sheet, &context.visa, &context.data);
        sheet.component(ScoreComponent::new(
            "eligibility",
            eligibility.score,
            context_weight(context, "eligibility")?,
            format!("{} of {} checks met", eligibility.met, eligibility.checks),
        ));

        let documents = score_documents(
            &mut sheet,
            &context.visa.base_requirements.required_documents,
            &context.data,
        );
        sheet.component(ScoreComponent::new(
            "documents",
            documents.score,
            context_weight(context, "documents")?,
            documents.details(),
        ));

        let expertise_weight = context_weight(context, "expertise")?;
        let expertise = match context.visa.profile {
            ScoringProfile::Academic => {
                let assessment = self.academic.assess(&context.data);
                recommend_academic(&mut sheet, &assessment);
                let component = ScoreComponent::new(
                    "expertise",
                    assessment.normalized_score,
                    expertise_weight,
                    format!(
                        "{} of {} academic points",
                        assessment.raw_total, assessment.max_total
                    ),
                );
                details.academic = Some(assessment);
                component
            }
            ScoringProfile::PointsBased => {
                let (score, note) = points_expertise(&context.visa, &context.data);
                ScoreComponent::new("expertise", score, expertise_weight, note)
            }
            _ => {
                let (score, note) = linear_expertise(&mut sheet, &context.visa, &context.data);
                ScoreComponent::new("expertise", score, expertise_weight, note)
            }
        };
        sheet.component(expertise);

        Ok(StrategyOutcome::finish(details, sheet))
    }
}

fn recommend_academic(sheet: &mut ScoreSheet, assessment: &AcademicAssessment) {
    if !assessment.manual_minimum.met {
        sheet.recommend(
            Priority::High,
            "expertise",
            format!(
                "Qualification, experience, and research total {} points; at least {} are required",
                assessment.manual_minimum.subtotal, assessment.manual_minimum.floor
            ),
        );
    }
    let priority = if assessment.eligible {
        Priority::Low
    } else {
        Priority::Medium
    };
    for action in &assessment.growth.priority_actions {
        sheet.recommend(
            priority,
            "growth",
            format!("{} (about {} months)", action.action, action.months),
        );
    }
}

/// Self-reported points total against 125% of the visa minimum.
fn points_expertise(visa: &VisaConfig, data: &ApplicantData) -> (f64, String) {
    let minimum = visa.min_points().unwrap_or(DEFAULT_MIN_POINTS);
    let points = data.number("points_total").unwrap_or(0.0).max(0.0);
    let score = (points / (minimum * POINTS_HEADROOM) * 100.0).min(100.0);
    (score, format!("{points} points against a minimum of {minimum}"))
}

/// Certificates, experience against twice the minimum, and salary against the floor.
fn linear_expertise(sheet: &mut ScoreSheet, visa: &VisaConfig, data: &ApplicantData) -> (f64, String) {
    let certificates = data
        .number("certifications")
        .unwrap_or_else(|| data.list_at(&["certificates"]).len() as f64)
        .max(0.0);
    let years = data
        .number("experience_years")
        .or_else(|| data.number("experience"))
        .unwrap_or(0.0)
        .max(0.0);
    let target_years = (visa.base_requirements.min_experience_years * 2.0).max(2.0);
    let salary = data.number("salary");

    let salary_ratio = match (visa.base_requirements.min_salary, salary) {
        (Some(floor), Some(salary)) if floor > 0.0 => (salary / floor).min(1.0),
        (Some(_), None) => 0.0,
        (_, Some(_)) => 1.0,
        (None, None) => UNKNOWN_SALARY_RATIO,
    };

    if certificates < 1.0 {
        sheet.recommend(
            Priority::Low,
            "expertise",
            "Add professional certifications relevant to the role",
        );
    }

    let score = 40.0 * (certificates / TARGET_CERTIFICATES).min(1.0)
        + 30.0 * (years / target_years).min(1.0)
        + 30.0 * salary_ratio.max(0.0);
    (
        score,
        format!(
            "{certificates} certificates, {years} of {target_years} target years, salary ratio {}",
            round2(salary_ratio)
        ),
    )
}
