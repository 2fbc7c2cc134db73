//! Post-evaluation workflow state machine.
//!
//! Every template starts at `evaluation-complete`; transitions are legal only when the
//! target is listed in the template's adjacency map.

mod steps;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{normalize_code, ApplicationMode};

pub use steps::{StepDefinition, TemplateName, WorkflowStep, WorkflowTemplate};

const REVIEW_WATCH_LIST: [&str; 2] = ["E-7", "F-2-7"];
const SKIP_LEGAL_MATCHING: &str = "skip-legal-matching";
const PAY_LATER: &str = "pay-later";

/// Serializable projection of a [`StepDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub id: WorkflowStep,
    pub name: &'static str,
    pub description: &'static str,
    pub actions: Vec<&'static str>,
    pub estimated_days: u32,
    pub required: bool,
}

impl From<&StepDefinition> for StepView {
    fn from(definition: &StepDefinition) -> Self {
        Self {
            id: definition.step,
            name: definition.name,
            description: definition.description,
            actions: definition.actions.clone(),
            estimated_days: definition.estimated_days,
            required: definition.required,
        }
    }
}

/// Next-steps bundle attached to every evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPlan {
    pub current_step: StepView,
    pub next_steps: Vec<StepView>,
    pub template_name: TemplateName,
    /// Duration of the whole template, not only the steps still ahead.
    pub estimated_days: u32,
    pub actions: Vec<&'static str>,
    pub description: &'static str,
}

/// Result of applying one action to the state machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advance {
    Moved {
        template: TemplateName,
        from: WorkflowStep,
        to: WorkflowStep,
        step: StepView,
    },
    Paused {
        template: TemplateName,
        resume_from: WorkflowStep,
    },
    Completed {
        template: TemplateName,
        step: WorkflowStep,
    },
    Error {
        reason: String,
    },
}

/// Reachable steps from a given position, or the `error` pseudo-state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepLookup {
    Steps {
        template: TemplateName,
        current: WorkflowStep,
        next: Vec<StepView>,
    },
    Error {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct WorkflowPlanner {
    templates: BTreeMap<TemplateName, WorkflowTemplate>,
    steps: BTreeMap<WorkflowStep, StepDefinition>,
}

impl Default for WorkflowPlanner {
    fn default() -> Self {
        Self::standard()
    }
}

impl WorkflowPlanner {
    pub fn standard() -> Self {
        Self {
            templates: steps::standard_templates()
                .into_iter()
                .map(|template| (template.name, template))
                .collect(),
            steps: steps::standard_steps()
                .into_iter()
                .map(|definition| (definition.step, definition))
                .collect(),
        }
    }

    pub fn template(&self, name: TemplateName) -> Option<&WorkflowTemplate> {
        self.templates.get(&name)
    }

    pub fn step(&self, step: WorkflowStep) -> Option<&StepDefinition> {
        self.steps.get(&step)
    }

    pub fn select_template(
        &self,
        eligible: bool,
        visa_type: &str,
        mode: ApplicationMode,
    ) -> TemplateName {
        let watched = REVIEW_WATCH_LIST.contains(&normalize_code(visa_type).as_str());
        if !eligible {
            TemplateName::IneligiblePath
        } else if mode == ApplicationMode::Change || watched {
            TemplateName::ConditionalReviewPath
        } else {
            TemplateName::EligiblePath
        }
    }

    pub fn plan(&self, eligible: bool, visa_type: &str, mode: ApplicationMode) -> WorkflowPlan {
        let name = self.select_template(eligible, visa_type, mode);
        let template = &self.templates[&name];
        let current = template.initial();
        let current_view = self.view(current);

        let next_steps = template
            .targets(current)
            .unwrap_or_default()
            .iter()
            .map(|step| self.view(*step))
            .collect();

        let estimated_days = template
            .steps
            .iter()
            .filter_map(|step| self.steps.get(step))
            .map(|definition| definition.estimated_days)
            .sum();

        WorkflowPlan {
            actions: current_view.actions.clone(),
            description: current_view.description,
            current_step: current_view,
            next_steps,
            template_name: name,
            estimated_days,
        }
    }

    pub fn is_legal_transition(
        &self,
        template: TemplateName,
        from: WorkflowStep,
        to: WorkflowStep,
    ) -> bool {
        self.templates
            .get(&template)
            .and_then(|template| template.targets(from))
            .map(|targets| targets.contains(&to))
            .unwrap_or(false)
    }

    pub fn next_steps(&self, template: &str, step: &str) -> StepLookup {
        match self.resolve(template, step) {
            Ok((template, current)) => StepLookup::Steps {
                template: template.name,
                current,
                next: template
                    .targets(current)
                    .unwrap_or_default()
                    .iter()
                    .map(|step| self.view(*step))
                    .collect(),
            },
            Err(reason) => StepLookup::Error { reason },
        }
    }

    /// Applies `action` at `current_step`.
    pub fn advance(&self, template: &str, current_step: &str, action: &str) -> Advance {
        let (template, current) = match self.resolve(template, current_step) {
            Ok(resolved) => resolved,
            Err(reason) => return Advance::Error { reason },
        };

        let action = action.trim();
        if action == PAY_LATER {
            return Advance::Paused {
                template: template.name,
                resume_from: current,
            };
        }

        let targets = template.targets(current).unwrap_or_default();
        if targets.is_empty() {
            return Advance::Completed {
                template: template.name,
                step: current,
            };
        }

        let next = targets
            .iter()
            .copied()
            .find(|step| !(action == SKIP_LEGAL_MATCHING && *step == WorkflowStep::LegalMatching));

        match next {
            Some(to) => Advance::Moved {
                template: template.name,
                from: current,
                to,
                step: self.view(to),
            },
            None => Advance::Error {
                reason: format!(
                    "no transition remains from {} after {action}",
                    current.id()
                ),
            },
        }
    }

    fn resolve(
        &self,
        template: &str,
        step: &str,
    ) -> Result<(&WorkflowTemplate, WorkflowStep), String> {
        let template = TemplateName::parse(template)
            .and_then(|name| self.templates.get(&name))
            .ok_or_else(|| format!("unknown workflow template `{template}`"))?;
        let current = WorkflowStep::parse(step)
            .filter(|step| template.contains(*step))
            .ok_or_else(|| {
                format!(
                    "step `{step}` is not part of the {} template",
                    template.name.id()
                )
            })?;
        Ok((template, current))
    }

    fn view(&self, step: WorkflowStep) -> StepView {
        self.steps
            .get(&step)
            .map(StepView::from)
            .unwrap_or_else(|| StepView {
                id: step,
                name: step.id(),
                description: "",
                actions: Vec::new(),
                estimated_days: 0,
                required: false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_days_cover_the_whole_template() {
        let planner = WorkflowPlanner::standard();

        let eligible = planner.plan(true, "E-2", ApplicationMode::New);
        assert_eq!(eligible.template_name, TemplateName::EligiblePath);
        assert_eq!(eligible.estimated_days, 19);

        let ineligible = planner.plan(false, "E-2", ApplicationMode::New);
        assert_eq!(ineligible.estimated_days, 37);

        let conditional = planner.plan(true, "E-2", ApplicationMode::Change);
        assert_eq!(conditional.estimated_days, 26);
    }

    #[test]
    fn watch_listed_visas_go_to_conditional_review() {
        let planner = WorkflowPlanner::standard();
        let plan = planner.plan(true, "f-2-7", ApplicationMode::New);
        assert_eq!(plan.template_name, TemplateName::ConditionalReviewPath);
        assert_eq!(plan.current_step.id, WorkflowStep::EvaluationComplete);
        assert_eq!(plan.next_steps[0].id, WorkflowStep::ExpertReview);
    }

    #[test]
    fn ineligible_always_wins_over_review() {
        let planner = WorkflowPlanner::standard();
        assert_eq!(
            planner.select_template(false, "E-7", ApplicationMode::Change),
            TemplateName::IneligiblePath
        );
    }
}
