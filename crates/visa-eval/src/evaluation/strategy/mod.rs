//! Per-mode scoring strategies and the registry the orchestrator dispatches through.

mod base;
mod change;
mod extension;
mod generic;
mod new_application;
mod reason;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::academic::{AcademicAssessment, AcademicEvaluator, AcademicExtensionReport};
use super::context::{
    aggregate_score, Aggregation, EvaluationContext, Recommendation, ScoreComponent, ScoreSheet,
    Validation,
};
use super::error::{EvaluationError, StrategyInitError};
use super::rules::{RuleEvaluator, RuleReport};
use crate::catalog::{ApplicationMode, ConfigurationProvider};

pub use change::{evaluate_change_path, AlternativeKind, AlternativePath, ChangePathAssessment};
pub use extension::{check_extension_limit, ExtensionLimitCheck, DEFAULT_EXTENSION_LIMIT};
pub use generic::GenericStrategy;
pub use reason::{classify_reason, ReasonCategory, ReasonClassification};

/// Uniform scoring contract, one implementation per application mode.
pub trait ScoringStrategy: Send + Sync {
    fn mode(&self) -> ApplicationMode;
    fn name(&self) -> &'static str;
    fn evaluate(&self, context: &EvaluationContext) -> Result<StrategyOutcome, EvaluationError>;
}

/// Mode-specific details surfaced verbatim in the evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeDetails {
    pub strategy: &'static str,
    pub aggregation: Aggregation,
    pub components: Vec<ScoreComponent>,
    pub validations: Vec<Validation>,
    pub rule_report: RuleReport,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativePath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic: Option<AcademicAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_extension: Option<AcademicExtensionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_limit: Option<ExtensionLimitCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_path: Option<ChangePathAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonClassification>,
}

impl OutcomeDetails {
    pub fn new(strategy: &'static str, aggregation: Aggregation, rule_report: RuleReport) -> Self {
        Self {
            strategy,
            aggregation,
            components: Vec::new(),
            validations: Vec::new(),
            rule_report,
            blocked: false,
            block_reason: None,
            alternatives: Vec::new(),
            academic: None,
            academic_extension: None,
            extension_limit: None,
            change_path: None,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub details: OutcomeDetails,
    pub recommendations: Vec<Recommendation>,
    pub required_documents: Vec<String>,
    pub final_score: f64,
}

impl StrategyOutcome {
    /// Moves the sheet into the outcome; blocked outcomes always score 0.
    pub(crate) fn finish(mut details: OutcomeDetails, mut sheet: ScoreSheet) -> Self {
        let final_score = if details.blocked {
            0.0
        } else {
            aggregate_score(&sheet.components, details.aggregation)
        };
        let recommendations = sheet.ranked_recommendations();
        details.components = sheet.components;
        details.validations = sheet.validations;

        Self {
            details,
            recommendations,
            required_documents: sheet.required_documents,
            final_score,
        }
    }
}

/// Shared collaborators every strategy is built from.
#[derive(Clone)]
pub struct StrategyDependencies {
    pub catalog: Arc<dyn ConfigurationProvider>,
    pub rules: Arc<RuleEvaluator>,
    pub academic: Arc<AcademicEvaluator>,
}

/// Mode → strategy lookup table, filled once at startup.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<ApplicationMode, Arc<dyn ScoringStrategy>>,
}

impl StrategyRegistry {
    /// Registers the specialized strategy for every mode, substituting
    /// [`GenericStrategy`] for any that cannot be built.
    pub fn initialize(dependencies: &StrategyDependencies) -> Self {
        let mut registry = Self::default();
        for mode in ApplicationMode::ordered() {
            let strategy = match specialized(mode, dependencies) {
                Ok(strategy) => strategy,
                Err(error) => {
                    warn!(
                        mode = %mode,
                        error = %error,
                        "specialized strategy unavailable; registering generic fallback"
                    );
                    Arc::new(GenericStrategy::new(mode, dependencies.rules.clone()))
                }
            };
            registry.register(strategy);
        }
        registry
    }

    /// Replaces whatever is registered for the strategy's mode.
    pub fn register(&mut self, strategy: Arc<dyn ScoringStrategy>) {
        self.strategies.insert(strategy.mode(), strategy);
    }

    pub fn get(&self, mode: ApplicationMode) -> Option<Arc<dyn ScoringStrategy>> {
        self.strategies.get(&mode).cloned()
    }

    pub fn names(&self) -> Vec<(ApplicationMode, &'static str)> {
        self.strategies
            .iter()
            .map(|(mode, strategy)| (*mode, strategy.name()))
            .collect()
    }
}

fn specialized(
    mode: ApplicationMode,
    dependencies: &StrategyDependencies,
) -> Result<Arc<dyn ScoringStrategy>, StrategyInitError> {
    let strategy: Arc<dyn ScoringStrategy> = match mode {
        ApplicationMode::New => Arc::new(new_application::NewApplicationStrategy::new(dependencies)?),
        ApplicationMode::Extension => Arc::new(extension::ExtensionStrategy::new(dependencies)?),
        ApplicationMode::Change => Arc::new(change::ChangeStrategy::new(dependencies)?),
    };
    Ok(strategy)
}
