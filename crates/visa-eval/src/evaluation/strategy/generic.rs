use std::sync::Arc;

use super::base::{assess_eligibility, recommend_from_rules, score_documents};
use super::{OutcomeDetails, ScoringStrategy, StrategyOutcome};
use crate::catalog::ApplicationMode;
use crate::evaluation::context::{Aggregation, EvaluationContext, ScoreComponent, ScoreSheet};
use crate::evaluation::error::EvaluationError;
use crate::evaluation::rules::RuleEvaluator;

const ELIGIBILITY_WEIGHT: f64 = 50.0;
const DOCUMENTS_WEIGHT: f64 = 50.0;

/// Fallback used when a mode's specialized strategy cannot be built. It needs no
/// mode-specific weights, so it always constructs.
pub struct GenericStrategy {
    mode: ApplicationMode,
    rules: Arc<RuleEvaluator>,
}

impl GenericStrategy {
    pub fn new(mode: ApplicationMode, rules: Arc<RuleEvaluator>) -> Self {
        Self { mode, rules }
    }
}

impl ScoringStrategy for GenericStrategy {
    fn mode(&self) -> ApplicationMode {
        self.mode
    }

    fn name(&self) -> &'static str {
        "generic"
    }

    fn evaluate(&self, context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError> {
        let report = self.rules.apply(context);
        let mut sheet = ScoreSheet::default();
        recommend_from_rules(&mut sheet, &report);
        let details = OutcomeDetails::new(self.name(), Aggregation::Weighted, report);

        let eligibility = assess_eligibility(&mut sheet, &context.visa, &context.data);
        sheet.component(ScoreComponent::new(
            "eligibility",
            eligibility.score,
            ELIGIBILITY_WEIGHT,
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
            DOCUMENTS_WEIGHT,
            documents.details(),
        ));

        Ok(StrategyOutcome::finish(details, sheet))
    }
}
