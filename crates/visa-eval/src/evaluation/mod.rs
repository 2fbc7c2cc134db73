//! Visa evaluation decision engine.

pub mod academic;
mod context;
mod data;
mod error;
mod orchestrator;
mod router;
pub mod rules;
pub mod strategy;
pub mod workflow;

pub use context::{
    aggregate_score, clamp_score, Aggregation, EvaluationContext, Priority, Recommendation,
    ScoreComponent, Validation,
};
pub use data::{normalize_document_name, ApplicantData, SubmittedDocument};
pub use error::{EvaluationError, StrategyInitError};
pub use orchestrator::{
    new_evaluation_id, BatchItem, BatchReport, EnvelopeMetadata, ErrorCode, EvaluationEnvelope,
    EvaluationFailure, EvaluationOrchestrator, EvaluationRequest, EvaluationResult,
    ProcessingTime,
};
pub use router::{evaluation_router, visa_summaries, AdvanceRequest, VisaSummary};

#[cfg(test)]
mod tests;
