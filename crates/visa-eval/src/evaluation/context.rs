use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::data::ApplicantData;
use crate::catalog::{ApplicationMode, ApplicationModeConfig, VisaConfig};

/// Fully resolved, read-only input for one evaluation call.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub evaluation_id: String,
    pub visa_type: String,
    pub mode: ApplicationMode,
    pub visa: Arc<VisaConfig>,
    pub mode_config: Arc<ApplicationModeConfig>,
    pub data: ApplicantData,
    pub created_at: DateTime<Utc>,
}

impl EvaluationContext {
    pub fn new(
        evaluation_id: impl Into<String>,
        visa: Arc<VisaConfig>,
        mode_config: Arc<ApplicationModeConfig>,
        data: ApplicantData,
    ) -> Self {
        Self {
            evaluation_id: evaluation_id.into(),
            visa_type: visa.code.clone(),
            mode: mode_config.mode,
            visa,
            mode_config,
            data,
            created_at: Utc::now(),
        }
    }

    pub fn passing_score(&self) -> f64 {
        self.mode_config.passing_score
    }
}

/// How a strategy's components combine into its final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// `Σ score·weight / Σ weight`, renormalized when weights do not total 100.
    Weighted,
    /// Each component contributes fixed points toward a total of 100.
    AbsolutePoints,
}

/// One scored dimension; `score` is on 0..=100 and `points = score · weight / 100`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub name: String,
    pub score: f64,
    pub weight: f64,
    pub points: f64,
    pub details: String,
}

impl ScoreComponent {
    pub fn new(name: &str, score: f64, weight: f64, details: impl Into<String>) -> Self {
        let score = clamp_score(score);
        Self {
            name: name.to_string(),
            score: round2(score),
            weight,
            points: round2(score * weight / 100.0),
            details: details.into(),
        }
    }
}

/// Final score for a component collection, always clamped to 0..=100.
pub fn aggregate_score(components: &[ScoreComponent], aggregation: Aggregation) -> f64 {
    let total = match aggregation {
        Aggregation::AbsolutePoints => components.iter().map(|c| c.score * c.weight / 100.0).sum(),
        Aggregation::Weighted => {
            let weight_total: f64 = components.iter().map(|c| c.weight).sum();
            if weight_total <= 0.0 {
                0.0
            } else {
                let weighted: f64 = components.iter().map(|c| c.score * c.weight / 100.0).sum();
                if (weight_total - 100.0).abs() > f64::EPSILON {
                    weighted / weight_total * 100.0
                } else {
                    weighted
                }
            }
        }
    };
    round2(clamp_score(total))
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub rule: String,
    pub passed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub message: String,
}

/// Per-call accumulator a strategy fills while scoring; never shared between calls.
#[derive(Debug, Default)]
pub(crate) struct ScoreSheet {
    pub components: Vec<ScoreComponent>,
    pub validations: Vec<Validation>,
    pub recommendations: Vec<Recommendation>,
    pub required_documents: Vec<String>,
}

impl ScoreSheet {
    pub fn component(&mut self, component: ScoreComponent) {
        self.components.push(component);
    }

    pub fn validate(&mut self, rule: &str, passed: bool, message: impl Into<String>) {
        self.validations.push(Validation {
            rule: rule.to_string(),
            passed,
            message: message.into(),
        });
    }

    pub fn recommend(&mut self, priority: Priority, category: &str, message: impl Into<String>) {
        let message = message.into();
        if self
            .recommendations
            .iter()
            .any(|existing| existing.message == message)
        {
            return;
        }
        self.recommendations.push(Recommendation {
            priority,
            category: category.to_string(),
            message,
        });
    }

    pub fn require_documents<'a>(&mut self, documents: impl IntoIterator<Item = &'a String>) {
        for document in documents {
            if !self.required_documents.contains(document) {
                self.required_documents.push(document.clone());
            }
        }
    }

    /// Recommendations ranked by priority, insertion order kept within a tier.
    pub fn ranked_recommendations(&mut self) -> Vec<Recommendation> {
        let mut ranked = std::mem::take(&mut self.recommendations);
        ranked.sort_by_key(|recommendation| recommendation.priority);
        ranked
    }
}
