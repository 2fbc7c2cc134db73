use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::academic::AcademicEvaluator;
use super::context::{
    aggregate_score, clamp_score, round2, EvaluationContext, Recommendation,
};
use super::data::ApplicantData;
use super::error::EvaluationError;
use super::rules::RuleEvaluator;
use super::strategy::{
    OutcomeDetails, ScoringStrategy, StrategyDependencies, StrategyOutcome, StrategyRegistry,
};
use super::workflow::{WorkflowPlan, WorkflowPlanner};
use crate::catalog::{ApplicationMode, Complexity, ConfigurationProvider, StaticCatalog, VisaConfig};

/// One evaluation call as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub visa_type: String,
    pub mode: String,
    #[serde(default)]
    pub data: Value,
}

/// Stable failure codes surfaced in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidVisaType,
    InvalidMode,
    UnsupportedMode,
    InvalidData,
    ConfigurationMissing,
    EvaluationFailed,
}

impl ErrorCode {
    /// Input-validation failures, as opposed to failures inside scoring.
    pub const fn is_validation(self) -> bool {
        !matches!(self, Self::EvaluationFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationFailure {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
}

impl EvaluationFailure {
    fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeMetadata {
    pub visa_type: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub processing_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingTime {
    pub min_days: u32,
    pub max_days: u32,
    pub multiplier: f64,
    pub complexity: Complexity,
}

/// Caller-facing result of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub eligible: bool,
    pub score: f64,
    pub passing_score: f64,
    pub details: OutcomeDetails,
    pub recommendations: Vec<Recommendation>,
    pub required_documents: Vec<String>,
    pub next_steps: WorkflowPlan,
    pub processing_time: ProcessingTime,
    pub complexity: Complexity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationEnvelope {
    pub success: bool,
    pub evaluation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EvaluationFailure>,
    pub metadata: EnvelopeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub input: EvaluationRequest,
    pub evaluation_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EvaluationFailure>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItem>,
}

/// `EVAL-<unix millis>-<8 hex chars>`.
pub fn new_evaluation_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("EVAL-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Validates requests, dispatches them to the mode's strategy, and post-processes the
/// outcome into the envelope. Holds only read-only state, so one instance serves every
/// concurrent caller.
pub struct EvaluationOrchestrator {
    catalog: Arc<dyn ConfigurationProvider>,
    registry: StrategyRegistry,
    planner: WorkflowPlanner,
}

impl EvaluationOrchestrator {
    pub fn new(catalog: Arc<dyn ConfigurationProvider>, academic: AcademicEvaluator) -> Self {
        let dependencies = StrategyDependencies {
            rules: Arc::new(RuleEvaluator::new(catalog.clone())),
            academic: Arc::new(academic),
            catalog: catalog.clone(),
        };
        let registry = StrategyRegistry::initialize(&dependencies);
        for (mode, name) in registry.names() {
            info!(mode = %mode, strategy = name, "scoring strategy registered");
        }

        Self {
            catalog,
            registry,
            planner: WorkflowPlanner::standard(),
        }
    }

    /// Built-in catalog with the default reference income.
    pub fn standard() -> Self {
        Self::new(Arc::new(StaticCatalog::standard()), AcademicEvaluator::default())
    }

    /// Overrides the strategy registered for the strategy's mode.
    pub fn with_strategy(mut self, strategy: Arc<dyn ScoringStrategy>) -> Self {
        self.registry.register(strategy);
        self
    }

    pub fn catalog(&self) -> &dyn ConfigurationProvider {
        self.catalog.as_ref()
    }

    pub fn planner(&self) -> &WorkflowPlanner {
        &self.planner
    }

    pub fn evaluate(&self, request: &EvaluationRequest) -> EvaluationEnvelope {
        let started = Instant::now();
        let evaluation_id = new_evaluation_id();
        info!(
            evaluation_id = %evaluation_id,
            visa_type = %request.visa_type,
            mode = %request.mode,
            "evaluation started"
        );

        let outcome = self.run(&evaluation_id, request);
        let metadata = EnvelopeMetadata {
            visa_type: request.visa_type.clone(),
            mode: request.mode.clone(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            processing_ms: started.elapsed().as_millis() as u64,
        };

        match outcome {
            Ok(result) => {
                info!(
                    evaluation_id = %evaluation_id,
                    score = result.score,
                    eligible = result.eligible,
                    "evaluation completed"
                );
                EvaluationEnvelope {
                    success: true,
                    evaluation_id,
                    result: Some(result),
                    error: None,
                    metadata,
                }
            }
            Err(failure) => {
                if failure.code.is_validation() {
                    warn!(
                        evaluation_id = %evaluation_id,
                        code = ?failure.code,
                        message = %failure.message,
                        "evaluation rejected"
                    );
                } else {
                    error!(
                        evaluation_id = %evaluation_id,
                        message = %failure.message,
                        "evaluation failed"
                    );
                }
                EvaluationEnvelope {
                    success: false,
                    evaluation_id,
                    result: None,
                    error: Some(failure),
                    metadata,
                }
            }
        }
    }

    /// Sequential; one failing item never affects the others.
    pub fn evaluate_batch(&self, requests: Vec<EvaluationRequest>) -> BatchReport {
        let results: Vec<BatchItem> = requests
            .into_iter()
            .map(|input| {
                let envelope = self.evaluate(&input);
                BatchItem {
                    input,
                    evaluation_id: envelope.evaluation_id,
                    success: envelope.success,
                    result: envelope.result,
                    error: envelope.error,
                    timestamp: envelope.metadata.timestamp,
                }
            })
            .collect();

        let successful = results.iter().filter(|item| item.success).count();
        info!(total = results.len(), successful, "batch evaluation finished");

        BatchReport {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }

    fn run(
        &self,
        evaluation_id: &str,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationFailure> {
        let context = self.build_context(evaluation_id, request)?;

        let strategy = self
            .registry
            .get(context.mode)
            .ok_or(EvaluationError::StrategyUnavailable(context.mode))
            .map_err(|error| {
                EvaluationFailure::new(ErrorCode::EvaluationFailed, error.to_string(), Value::Null)
            })?;

        let outcome = strategy.evaluate(&context).map_err(|error| {
            EvaluationFailure::new(
                ErrorCode::EvaluationFailed,
                error.to_string(),
                json!({ "strategy": strategy.name() }),
            )
        })?;

        Ok(self.post_process(&context, outcome))
    }

    fn build_context(
        &self,
        evaluation_id: &str,
        request: &EvaluationRequest,
    ) -> Result<EvaluationContext, EvaluationFailure> {
        let visa = self.catalog.visa_config(&request.visa_type).ok_or_else(|| {
            EvaluationFailure::new(
                ErrorCode::InvalidVisaType,
                format!("unknown visa type `{}`", request.visa_type),
                json!({ "supported": self.catalog.supported_visa_types() }),
            )
        })?;

        let mode = ApplicationMode::parse(&request.mode).ok_or_else(|| {
            EvaluationFailure::new(
                ErrorCode::InvalidMode,
                format!("unknown application mode `{}`", request.mode),
                json!({ "supported": ApplicationMode::ordered().map(ApplicationMode::label) }),
            )
        })?;

        if !visa.supports(mode) {
            return Err(EvaluationFailure::new(
                ErrorCode::UnsupportedMode,
                format!("{} does not accept {mode} applications", visa.code),
                json!({ "supported": visa.supported_modes }),
            ));
        }

        let data = ApplicantData::from_value(request.data.clone()).ok_or_else(|| {
            EvaluationFailure::new(
                ErrorCode::InvalidData,
                "applicant data must be a JSON object",
                json!({ "received": json_kind(&request.data) }),
            )
        })?;

        let mode_config = self.catalog.application_mode_config(mode).ok_or_else(|| {
            EvaluationFailure::new(
                ErrorCode::ConfigurationMissing,
                format!("no mode configuration is loaded for {mode} applications"),
                Value::Null,
            )
        })?;

        Ok(EvaluationContext::new(evaluation_id, visa, mode_config, data))
    }

    fn post_process(&self, context: &EvaluationContext, outcome: StrategyOutcome) -> EvaluationResult {
        let score = if outcome.details.blocked {
            0.0
        } else {
            aggregate_score(&outcome.details.components, outcome.details.aggregation)
        };
        let reported = round2(clamp_score(outcome.final_score));
        if (reported - score).abs() > 0.01 {
            warn!(
                evaluation_id = %context.evaluation_id,
                strategy = outcome.details.strategy,
                reported,
                recomputed = score,
                "strategy score disagrees with its components; using the recomputed score"
            );
        }
        let passing_score = context.passing_score();
        let eligible = !outcome.details.blocked && score >= passing_score;

        let complexity = if context.mode == ApplicationMode::Change {
            context.visa.complexity.promoted()
        } else {
            context.visa.complexity
        };

        EvaluationResult {
            eligible,
            score,
            passing_score,
            next_steps: self.planner.plan(eligible, &context.visa_type, context.mode),
            processing_time: processing_time(&context.visa),
            complexity,
            recommendations: outcome.recommendations,
            required_documents: outcome.required_documents,
            details: outcome.details,
        }
    }
}

/// Catalog processing window scaled by the visa's own complexity multiplier.
fn processing_time(visa: &VisaConfig) -> ProcessingTime {
    let multiplier = visa.complexity.multiplier();
    ProcessingTime {
        min_days: (visa.processing_days.min as f64 * multiplier).round() as u32,
        max_days: (visa.processing_days.max as f64 * multiplier).round() as u32,
        multiplier,
        complexity: visa.complexity,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
