use std::sync::Arc;

use serde::Serialize;

use super::base::{
    assess_eligibility, context_weight, recommend_from_rules, require_weights, score_documents,
    score_stay_history,
};
use super::reason::classify_applicant_reason;
use super::{OutcomeDetails, ScoringStrategy, StrategyDependencies, StrategyOutcome};
use crate::catalog::{
    normalize_code, ApplicationMode, ChangeConditions, ChangeDifficulty, ChangePathRule,
    ConfigurationProvider, ScoringProfile,
};
use crate::evaluation::academic::AcademicEvaluator;
use crate::evaluation::context::{
    round2, Aggregation, EvaluationContext, Priority, ScoreComponent, ScoreSheet,
};
use crate::evaluation::data::ApplicantData;
use crate::evaluation::error::{EvaluationError, StrategyInitError};
use crate::evaluation::rules::RuleEvaluator;

const WEIGHTS: [&str; 5] = ["changeability", "stay_history", "requirements", "reason", "documents"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlternativeKind {
    Intermediate,
    ExitAndReapply,
}

/// A suggested route when the direct change is not permitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativePath {
    pub kind: AlternativeKind,
    pub route: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    pub description: String,
}

impl AlternativePath {
    fn exit_and_reapply(from: &str, to: &str) -> Self {
        Self {
            kind: AlternativeKind::ExitAndReapply,
            route: vec![from.to_string(), to.to_string()],
            success_rate: None,
            description: format!(
                "Depart on the current {from} status and file a new {to} application from abroad"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePathAssessment {
    pub from: String,
    pub to: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<ChangeDifficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    pub reason: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativePath>,
    #[serde(skip)]
    pub rule: Option<ChangePathRule>,
}

/// Looks up the direct path; when it is missing or prohibited the result always carries at
/// least the exit-and-reapply fallback.
pub fn evaluate_change_path(
    catalog: &dyn ConfigurationProvider,
    from: &str,
    to: &str,
) -> ChangePathAssessment {
    let from = normalize_code(from);
    let to = normalize_code(to);

    match catalog.change_path_rule(&from, &to) {
        Some(rule) if rule.allowed => ChangePathAssessment {
            reason: format!("change from {from} to {to} is permitted"),
            difficulty: Some(rule.difficulty),
            success_rate: Some(rule.success_rate),
            allowed: true,
            alternatives: Vec::new(),
            rule: Some(rule),
            from,
            to,
        },
        found => {
            let reason = if found.is_some() {
                format!("change from {from} to {to} is prohibited")
            } else {
                format!("no change path is configured from {from} to {to}")
            };
            ChangePathAssessment {
                alternatives: alternatives(catalog, &from, &to),
                difficulty: found.as_ref().map(|rule| rule.difficulty),
                success_rate: None,
                allowed: false,
                reason,
                rule: found,
                from,
                to,
            }
        }
    }
}

fn alternatives(catalog: &dyn ConfigurationProvider, from: &str, to: &str) -> Vec<AlternativePath> {
    let permitted = |a: &str, b: &str| catalog.change_path_rule(a, b).filter(|rule| rule.allowed);

    let mut found: Vec<AlternativePath> = catalog
        .supported_visa_types()
        .into_iter()
        .filter(|middle| middle != from && middle != to)
        .filter_map(|middle| {
            let first = permitted(from, &middle)?;
            let second = permitted(&middle, to)?;
            Some(AlternativePath {
                kind: AlternativeKind::Intermediate,
                success_rate: Some(round2(first.success_rate * second.success_rate)),
                description: format!("Change to {middle} first, then from {middle} to {to}"),
                route: vec![from.to_string(), middle, to.to_string()],
            })
        })
        .collect();

    found.sort_by(|a, b| {
        b.success_rate
            .unwrap_or(0.0)
            .total_cmp(&a.success_rate.unwrap_or(0.0))
    });
    found.push(AlternativePath::exit_and_reapply(from, to));
    found
}

/// Scores a status change: legality first, then five weighted components.
pub(super) struct ChangeStrategy {
    catalog: Arc<dyn ConfigurationProvider>,
    rules: Arc<RuleEvaluator>,
    academic: Arc<AcademicEvaluator>,
}

impl ChangeStrategy {
    pub fn new(dependencies: &StrategyDependencies) -> Result<Self, StrategyInitError> {
        require_weights(dependencies, ApplicationMode::Change, &WEIGHTS)?;
        Ok(Self {
            catalog: dependencies.catalog.clone(),
            rules: dependencies.rules.clone(),
            academic: dependencies.academic.clone(),
        })
    }
}

impl ScoringStrategy for ChangeStrategy {
    fn mode(&self) -> ApplicationMode {
        ApplicationMode::Change
    }

    fn name(&self) -> &'static str {
        "status_change"
    }

    fn evaluate(&self, context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError> {
        let report = self.rules.apply(context);
        let mut sheet = ScoreSheet::default();
        recommend_from_rules(&mut sheet, &report);
        let mut details = OutcomeDetails::new(self.name(), Aggregation::Weighted, report);
        let data = &context.data;

        let Some(from) = data.text("current_visa") else {
            let reason = "current visa not provided".to_string();
            sheet.validate("change_path", false, reason.clone());
            sheet.recommend(
                Priority::High,
                "change_path",
                "State the current visa so the change path can be checked",
            );
            details.blocked = true;
            details.block_reason = Some(reason);
            return Ok(StrategyOutcome::finish(details, sheet));
        };
        let path = evaluate_change_path(self.catalog.as_ref(), from, &context.visa_type);

        if !path.allowed {
            sheet.validate("change_path", false, path.reason.clone());
            sheet.recommend(Priority::High, "change_path", path.reason.clone());
            for alternative in &path.alternatives {
                sheet.recommend(Priority::Medium, "alternatives", alternative.description.clone());
            }
            details.blocked = true;
            details.block_reason = Some(path.reason.clone());
            details.alternatives = path.alternatives.clone();
            details.change_path = Some(path);
            return Ok(StrategyOutcome::finish(details, sheet));
        }
        sheet.validate("change_path", true, path.reason.clone());

        let conditions = path
            .rule
            .as_ref()
            .map(|rule| rule.conditions.clone())
            .unwrap_or_default();
        let changeability = conditions_met(&mut sheet, &conditions, data);
        sheet.component(ScoreComponent::new(
            "changeability",
            changeability.0,
            context_weight(context, "changeability")?,
            changeability.1,
        ));

        let history = score_stay_history(&mut sheet, data);
        sheet.component(ScoreComponent::new(
            "stay_history",
            history.score,
            context_weight(context, "stay_history")?,
            format!("{} violations on record", history.violations.len()),
        ));

        let eligibility = assess_eligibility(&mut sheet, &context.visa, data);
        let (requirements, note) = if context.visa.profile == ScoringProfile::Academic {
            let assessment = self.academic.assess(data);
            let blended = (eligibility.score + assessment.normalized_score) / 2.0;
            let note = format!(
                "eligibility {} averaged with academic score {}",
                eligibility.score, assessment.normalized_score
            );
            details.academic = Some(assessment);
            (blended, note)
        } else {
            (
                eligibility.score,
                format!("{} of {} target requirements met", eligibility.met, eligibility.checks),
            )
        };
        sheet.component(ScoreComponent::new(
            "requirements",
            requirements,
            context_weight(context, "requirements")?,
            note,
        ));

        let reason = classify_applicant_reason(data);
        if reason.document_bonus == 0.0 {
            sheet.recommend(
                Priority::Low,
                "reason",
                "Attach documents supporting the stated reason for the change",
            );
        }
        sheet.component(ScoreComponent::new(
            "reason",
            reason.score,
            context_weight(context, "reason")?,
            format!("classified as {:?}", reason.category).to_lowercase(),
        ));
        details.reason = Some(reason);

        let documents = score_documents(
            &mut sheet,
            &context.visa.base_requirements.required_documents,
            data,
        );
        sheet.component(ScoreComponent::new(
            "documents",
            documents.score,
            context_weight(context, "documents")?,
            documents.details(),
        ));

        details.change_path = Some(path);
        Ok(StrategyOutcome::finish(details, sheet))
    }
}

/// Fraction of configured conditions the applicant meets; 100 when none are configured.
fn conditions_met(
    sheet: &mut ScoreSheet,
    conditions: &ChangeConditions,
    data: &ApplicantData,
) -> (f64, String) {
    let mut checks: Vec<(&str, bool, String)> = Vec::new();

    if let Some(floor) = conditions.min_education {
        let met = data.education().is_some_and(|level| level.meets(floor));
        checks.push(("min_education", met, format!("{} required", floor.label())));
    }
    if conditions.requires_job_offer {
        checks.push(("job_offer", data.flag("job_offer"), "job offer required".to_string()));
    }
    if let Some(floor) = conditions.min_salary {
        let met = data.number("salary").is_some_and(|salary| salary >= floor);
        checks.push(("min_salary", met, format!("salary of at least {floor:.0} required")));
    }
    if let Some(months) = conditions.min_stay_months {
        let stayed = data
            .number("stay_months")
            .or_else(|| data.number("total_stay_years").map(|years| years * 12.0));
        let met = stayed.is_some_and(|stayed| stayed >= f64::from(months));
        checks.push(("min_stay_months", met, format!("{months} months of stay required")));
    }
    if let Some(floor) = conditions.min_language {
        let met = data.language().is_some_and(|level| level >= floor);
        checks.push(("min_language", met, format!("{floor:?} language level required").to_lowercase()));
    }

    if checks.is_empty() {
        return (100.0, "no change conditions configured".to_string());
    }

    let met = checks.iter().filter(|(_, met, _)| *met).count();
    for (rule, passed, message) in &checks {
        sheet.validate(rule, *passed, message.clone());
        if !passed {
            sheet.recommend(Priority::High, "changeability", format!("Unmet condition: {message}"));
        }
    }
    (
        met as f64 / checks.len() as f64 * 100.0,
        format!("{met} of {} change conditions met", checks.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    #[test]
    fn unconfigured_path_offers_exit_and_reapply() {
        let catalog = StaticCatalog::standard();
        let assessment = evaluate_change_path(&catalog, "C-4", "D-2");
        assert!(!assessment.allowed);
        let last = assessment.alternatives.last().expect("fallback");
        assert_eq!(last.kind, AlternativeKind::ExitAndReapply);
    }

    #[test]
    fn intermediate_routes_multiply_success_rates() {
        let catalog = StaticCatalog::standard();
        // D-2 -> E-7 -> F-2-7 is configured in two legs
        let assessment = evaluate_change_path(&catalog, "d-2", "F-2-7");
        assert!(!assessment.allowed);
        let first = &assessment.alternatives[0];
        assert_eq!(first.kind, AlternativeKind::Intermediate);
        assert_eq!(first.route, ["D-2", "E-7", "F-2-7"]);
        assert!(first.success_rate.is_some());
    }
}
