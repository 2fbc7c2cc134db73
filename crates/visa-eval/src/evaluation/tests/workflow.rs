use crate::catalog::ApplicationMode;
use crate::evaluation::workflow::{
    Advance, StepLookup, TemplateName, WorkflowPlanner, WorkflowStep,
};

#[test]
fn every_listed_transition_is_legal_and_nothing_else_is() {
    let planner = WorkflowPlanner::standard();
    for name in TemplateName::all() {
        let template = planner.template(name).expect("template registered");
        for from in WorkflowStep::all() {
            let targets = template.targets(from).unwrap_or_default();
            for to in WorkflowStep::all() {
                assert_eq!(
                    planner.is_legal_transition(name, from, to),
                    targets.contains(&to),
                    "{} {} -> {}",
                    name.id(),
                    from.id(),
                    to.id()
                );
            }
        }
    }
}

#[test]
fn every_template_step_is_reachable_from_the_start() {
    let planner = WorkflowPlanner::standard();
    for name in TemplateName::all() {
        let template = planner.template(name).expect("template registered");
        let mut seen = vec![template.initial()];
        let mut frontier = vec![template.initial()];
        while let Some(step) = frontier.pop() {
            for next in template.targets(step).unwrap_or_default() {
                if !seen.contains(next) {
                    seen.push(*next);
                    frontier.push(*next);
                }
            }
        }
        for step in &template.steps {
            assert!(seen.contains(step), "{} unreachable in {}", step.id(), name.id());
        }
    }
}

#[test]
fn skipping_legal_matching_goes_straight_to_payment() {
    let planner = WorkflowPlanner::standard();
    let outcome = planner.advance("eligible-path", "document-preparation", "skip-legal-matching");
    match outcome {
        Advance::Moved { from, to, .. } => {
            assert_eq!(from, WorkflowStep::DocumentPreparation);
            assert_eq!(to, WorkflowStep::Payment);
        }
        other => panic!("expected a move, got {other:?}"),
    }

    let default = planner.advance("eligible-path", "document-preparation", "upload-documents");
    assert!(matches!(
        default,
        Advance::Moved {
            to: WorkflowStep::LegalMatching,
            ..
        }
    ));
}

#[test]
fn paying_later_pauses_at_the_current_step() {
    let outcome = WorkflowPlanner::standard().advance("eligible-path", "payment", "pay-later");
    assert_eq!(
        outcome,
        Advance::Paused {
            template: TemplateName::EligiblePath,
            resume_from: WorkflowStep::Payment,
        }
    );
}

#[test]
fn terminal_steps_complete() {
    let planner = WorkflowPlanner::standard();
    let outcome = planner.advance("ineligible-path", "reapplication-guide", "view-guide");
    assert_eq!(
        outcome,
        Advance::Completed {
            template: TemplateName::IneligiblePath,
            step: WorkflowStep::ReapplicationGuide,
        }
    );
}

#[test]
fn unknown_references_resolve_to_the_error_state() {
    let planner = WorkflowPlanner::standard();
    assert!(matches!(
        planner.advance("fast-track", "payment", "pay-now"),
        Advance::Error { .. }
    ));
    // Payment belongs to the eligible path only.
    assert!(matches!(
        planner.advance("ineligible-path", "payment", "pay-now"),
        Advance::Error { .. }
    ));
    assert!(matches!(
        planner.next_steps("conditional-review-path", "teleport"),
        StepLookup::Error { .. }
    ));
}

#[test]
fn next_steps_lists_the_adjacent_views() {
    let lookup = WorkflowPlanner::standard().next_steps("conditional-review-path", "document-preparation");
    match lookup {
        StepLookup::Steps { next, .. } => {
            let ids: Vec<WorkflowStep> = next.iter().map(|view| view.id).collect();
            assert_eq!(ids, vec![WorkflowStep::LegalMatching, WorkflowStep::ProceedOrReject]);
        }
        StepLookup::Error { reason } => panic!("unexpected error: {reason}"),
    }
}

#[test]
fn change_applications_always_get_expert_review() {
    let planner = WorkflowPlanner::standard();
    let plan = planner.plan(true, "E-2", ApplicationMode::Change);
    assert_eq!(plan.template_name, TemplateName::ConditionalReviewPath);
    assert_eq!(plan.current_step.id, WorkflowStep::EvaluationComplete);
    assert_eq!(plan.next_steps.len(), 1);
    assert_eq!(plan.next_steps[0].id, WorkflowStep::ExpertReview);
}
