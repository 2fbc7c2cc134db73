use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    EvaluationComplete,
    DocumentPreparation,
    LegalMatching,
    Payment,
    ApplicationSubmission,
    ImprovementPlan,
    AlternativeVisaReview,
    ReapplicationGuide,
    ExpertReview,
    ProceedOrReject,
}

impl WorkflowStep {
    pub const fn all() -> [Self; 10] {
        [
            Self::EvaluationComplete,
            Self::DocumentPreparation,
            Self::LegalMatching,
            Self::Payment,
            Self::ApplicationSubmission,
            Self::ImprovementPlan,
            Self::AlternativeVisaReview,
            Self::ReapplicationGuide,
            Self::ExpertReview,
            Self::ProceedOrReject,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::EvaluationComplete => "evaluation-complete",
            Self::DocumentPreparation => "document-preparation",
            Self::LegalMatching => "legal-matching",
            Self::Payment => "payment",
            Self::ApplicationSubmission => "application-submission",
            Self::ImprovementPlan => "improvement-plan",
            Self::AlternativeVisaReview => "alternative-visa-review",
            Self::ReapplicationGuide => "reapplication-guide",
            Self::ExpertReview => "expert-review",
            Self::ProceedOrReject => "proceed-or-reject",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all().into_iter().find(|step| step.id() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateName {
    EligiblePath,
    IneligiblePath,
    ConditionalReviewPath,
}

impl TemplateName {
    pub const fn all() -> [Self; 3] {
        [
            Self::EligiblePath,
            Self::IneligiblePath,
            Self::ConditionalReviewPath,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::EligiblePath => "eligible-path",
            Self::IneligiblePath => "ineligible-path",
            Self::ConditionalReviewPath => "conditional-review-path",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all().into_iter().find(|name| name.id() == raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepDefinition {
    pub step: WorkflowStep,
    pub name: &'static str,
    pub description: &'static str,
    pub actions: Vec<&'static str>,
    pub estimated_days: u32,
    pub required: bool,
}

/// Ordered steps plus the adjacency map that defines every legal transition.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    pub name: TemplateName,
    pub steps: Vec<WorkflowStep>,
    pub adjacency: BTreeMap<WorkflowStep, Vec<WorkflowStep>>,
}

impl WorkflowTemplate {
    pub fn initial(&self) -> WorkflowStep {
        WorkflowStep::EvaluationComplete
    }

    pub fn targets(&self, from: WorkflowStep) -> Option<&[WorkflowStep]> {
        self.adjacency.get(&from).map(Vec::as_slice)
    }

    pub fn contains(&self, step: WorkflowStep) -> bool {
        self.steps.contains(&step)
    }
}

pub(super) fn standard_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition {
            step: WorkflowStep::EvaluationComplete,
            name: "Evaluation complete",
            description: "Review the eligibility score and the recommendations it produced.",
            actions: vec!["view-report", "download-report"],
            estimated_days: 0,
            required: true,
        },
        StepDefinition {
            step: WorkflowStep::DocumentPreparation,
            name: "Document preparation",
            description: "Collect, translate, and certify every document on the checklist.",
            actions: vec!["view-checklist", "upload-documents"],
            estimated_days: 14,
            required: true,
        },
        StepDefinition {
            step: WorkflowStep::LegalMatching,
            name: "Legal matching",
            description: "Match with an immigration attorney or licensed agent for filing support.",
            actions: vec!["match-lawyer", "skip-legal-matching"],
            estimated_days: 3,
            required: false,
        },
        StepDefinition {
            step: WorkflowStep::Payment,
            name: "Payment",
            description: "Settle government filing fees and any service fees.",
            actions: vec!["pay-now", "pay-later"],
            estimated_days: 1,
            required: true,
        },
        StepDefinition {
            step: WorkflowStep::ApplicationSubmission,
            name: "Application submission",
            description: "File the completed application with the immigration office.",
            actions: vec!["submit-application"],
            estimated_days: 1,
            required: true,
        },
        StepDefinition {
            step: WorkflowStep::ImprovementPlan,
            name: "Improvement plan",
            description: "Work through the improvement roadmap to close the scoring gap.",
            actions: vec!["view-roadmap", "track-progress"],
            estimated_days: 30,
            required: false,
        },
        StepDefinition {
            step: WorkflowStep::AlternativeVisaReview,
            name: "Alternative visa review",
            description: "Compare visa categories that better fit the current profile.",
            actions: vec!["explore-alternatives"],
            estimated_days: 5,
            required: false,
        },
        StepDefinition {
            step: WorkflowStep::ReapplicationGuide,
            name: "Reapplication guide",
            description: "Plan a reapplication once the identified gaps are closed.",
            actions: vec!["view-guide", "schedule-reevaluation"],
            estimated_days: 2,
            required: true,
        },
        StepDefinition {
            step: WorkflowStep::ExpertReview,
            name: "Expert review",
            description: "An immigration specialist reviews the case before filing.",
            actions: vec!["request-review"],
            estimated_days: 7,
            required: true,
        },
        StepDefinition {
            step: WorkflowStep::ProceedOrReject,
            name: "Proceed or reject",
            description: "Decide whether to file based on the expert review outcome.",
            actions: vec!["proceed", "withdraw"],
            estimated_days: 2,
            required: true,
        },
    ]
}

pub(super) fn standard_templates() -> Vec<WorkflowTemplate> {
    use WorkflowStep::*;

    let template = |name, steps: Vec<WorkflowStep>, edges: Vec<(WorkflowStep, Vec<WorkflowStep>)>| {
        WorkflowTemplate {
            name,
            steps,
            adjacency: edges.into_iter().collect(),
        }
    };

    vec![
        template(
            TemplateName::EligiblePath,
            vec![
                EvaluationComplete,
                DocumentPreparation,
                LegalMatching,
                Payment,
                ApplicationSubmission,
            ],
            vec![
                (EvaluationComplete, vec![DocumentPreparation]),
                (DocumentPreparation, vec![LegalMatching, Payment]),
                (LegalMatching, vec![Payment]),
                (Payment, vec![ApplicationSubmission]),
                (ApplicationSubmission, vec![]),
            ],
        ),
        template(
            TemplateName::IneligiblePath,
            vec![
                EvaluationComplete,
                ImprovementPlan,
                AlternativeVisaReview,
                ReapplicationGuide,
            ],
            vec![
                (EvaluationComplete, vec![ImprovementPlan, AlternativeVisaReview]),
                (ImprovementPlan, vec![ReapplicationGuide]),
                (AlternativeVisaReview, vec![ReapplicationGuide]),
                (ReapplicationGuide, vec![]),
            ],
        ),
        template(
            TemplateName::ConditionalReviewPath,
            vec![
                EvaluationComplete,
                ExpertReview,
                DocumentPreparation,
                LegalMatching,
                ProceedOrReject,
            ],
            vec![
                (EvaluationComplete, vec![ExpertReview]),
                (ExpertReview, vec![DocumentPreparation]),
                (DocumentPreparation, vec![LegalMatching, ProceedOrReject]),
                (LegalMatching, vec![ProceedOrReject]),
                (ProceedOrReject, vec![]),
            ],
        ),
    ]
}
