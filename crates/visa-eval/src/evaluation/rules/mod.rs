mod validators;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::context::{round2, EvaluationContext};
use crate::catalog::{normalize_code, ApplicationMode, ConfigurationProvider};

pub use validators::meets_education_floor;

/// Everything a field validator may inspect.
pub struct ValidationInput<'a> {
    pub field: &'a str,
    pub value: &'a Value,
    pub context: &'a EvaluationContext,
    pub catalog: &'a dyn ConfigurationProvider,
}

/// Verdict of a validator that managed to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCheck {
    pub valid: bool,
    pub message: String,
}

impl RuleCheck {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// A validator that could not reach a verdict. Recorded as a warning, never a failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleFault {
    #[error("field `{field}` should be {expected}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },
    #[error("field `{field}` has unrecognized value `{value}`")]
    Unrecognized { field: String, value: String },
    #[error("no reference value configured for `{0}`")]
    MissingReference(String),
}

pub type FieldValidator = fn(&ValidationInput<'_>) -> Result<RuleCheck, RuleFault>;

/// Required fields plus per-field validators. Sets are combined with [`RuleSet::merged`],
/// which leaves both inputs untouched.
#[derive(Clone, Default)]
pub struct RuleSet {
    required: Vec<String>,
    validators: BTreeMap<String, FieldValidator>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("required", &self.required)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, field: &str) -> Self {
        if !self.required.iter().any(|existing| existing == field) {
            self.required.push(field.to_string());
        }
        self
    }

    pub fn validate(mut self, field: &str, validator: FieldValidator) -> Self {
        self.validators.insert(field.to_string(), validator);
        self
    }

    /// `self` extended by `other`; validators in `other` win on the same field.
    pub fn merged(&self, other: &RuleSet) -> RuleSet {
        let mut merged = self.clone();
        for field in &other.required {
            merged = merged.require(field);
        }
        for (field, validator) in &other.validators {
            merged.validators.insert(field.clone(), *validator);
        }
        merged
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEntry {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuleReport {
    pub passed: Vec<RuleEntry>,
    pub failed: Vec<RuleEntry>,
    pub warnings: Vec<RuleEntry>,
    pub score: f64,
}

/// Holds the per-mode templates and visa overrides, and scores submissions against them.
pub struct RuleEvaluator {
    catalog: Arc<dyn ConfigurationProvider>,
    templates: BTreeMap<ApplicationMode, RuleSet>,
    overrides: BTreeMap<String, RuleSet>,
}

impl RuleEvaluator {
    pub fn new(catalog: Arc<dyn ConfigurationProvider>) -> Self {
        Self {
            catalog,
            templates: validators::mode_templates(),
            overrides: validators::visa_overrides(),
        }
    }

    pub fn with_override(mut self, visa_type: &str, rules: RuleSet) -> Self {
        self.overrides.insert(normalize_code(visa_type), rules);
        self
    }

    pub fn rule_set(&self, mode: ApplicationMode, visa_type: &str) -> RuleSet {
        let template = self.templates.get(&mode).cloned().unwrap_or_default();
        match self.overrides.get(&normalize_code(visa_type)) {
            Some(specific) => template.merged(specific),
            None => template,
        }
    }

    pub fn apply(&self, context: &EvaluationContext) -> RuleReport {
        let rules = self.rule_set(context.mode, &context.visa_type);
        let mut report = RuleReport::default();

        for field in rules.required_fields() {
            if !context.data.contains(field) {
                report.failed.push(RuleEntry {
                    field: field.clone(),
                    message: format!("required field `{field}` is missing"),
                });
            }
        }

        for (field, validator) in &rules.validators {
            let Some(value) = context.data.get(field) else {
                continue;
            };

            let input = ValidationInput {
                field,
                value,
                context,
                catalog: self.catalog.as_ref(),
            };

            match validator(&input) {
                Ok(check) => {
                    let entry = RuleEntry {
                        field: field.clone(),
                        message: check.message,
                    };
                    if check.valid {
                        report.passed.push(entry);
                    } else {
                        report.failed.push(entry);
                    }
                }
                Err(fault) => {
                    warn!(
                        evaluation_id = %context.evaluation_id,
                        field = %field,
                        error = %fault,
                        "rule validator could not run; recording warning"
                    );
                    report.warnings.push(RuleEntry {
                        field: field.clone(),
                        message: fault.to_string(),
                    });
                }
            }
        }

        let ran = report.passed.len() + report.failed.len();
        report.score = if ran == 0 {
            0.0
        } else {
            round2(report.passed.len() as f64 / ran as f64 * 100.0)
        };
        report
    }
}
