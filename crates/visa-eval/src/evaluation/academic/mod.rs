//! Multi-factor point scoring for academic visa categories.
//!
//! The new-application pipeline sums six capped sub-scores against a fixed maximum and
//! projects how the applicant could close the gap to passing. The extension pipeline is a
//! set of threshold checks with partial credit and accumulates no points.

mod extension;
mod growth;
mod scoring;

use serde::Serialize;

use crate::evaluation::context::round2;
use crate::evaluation::data::ApplicantData;

pub use extension::{AcademicExtensionReport, ThresholdCheck};
pub use growth::{
    Difficulty, GrowthFactor, GrowthOpportunity, GrowthProjection, ImprovementRoadmap,
    RoadmapPhase,
};
pub use scoring::{
    AcademicProfile, AcademicTitle, PointBreakdown, MANUAL_MINIMUM, MAX_RAW_POINTS, PASSING_SCORE,
};

/// Reference national-income figure used for the extension income floor.
pub const DEFAULT_REFERENCE_INCOME: f64 = 44_050_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualMinimum {
    pub subtotal: f64,
    pub floor: f64,
    pub met: bool,
}

/// Full new-application result, including the forward-looking projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicAssessment {
    pub breakdown: PointBreakdown,
    pub raw_total: f64,
    pub max_total: f64,
    pub normalized_score: f64,
    pub passing_score: f64,
    pub eligible: bool,
    pub manual_minimum: ManualMinimum,
    pub growth: GrowthProjection,
    pub roadmap: ImprovementRoadmap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcademicEvaluator {
    reference_income: f64,
}

impl Default for AcademicEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_INCOME)
    }
}

impl AcademicEvaluator {
    pub fn new(reference_income: f64) -> Self {
        Self { reference_income }
    }

    pub fn assess(&self, data: &ApplicantData) -> AcademicAssessment {
        let profile = AcademicProfile::from_data(data);
        let breakdown = PointBreakdown::score(&profile);
        let normalized_score = breakdown.normalized();

        let subtotal = breakdown.core_total();
        let manual_minimum = ManualMinimum {
            subtotal,
            floor: MANUAL_MINIMUM,
            met: subtotal >= MANUAL_MINIMUM,
        };

        let growth = growth::project(&profile, &breakdown, normalized_score);
        let roadmap = growth::roadmap(normalized_score, &growth.opportunities);

        AcademicAssessment {
            raw_total: round2(breakdown.total()),
            max_total: MAX_RAW_POINTS,
            normalized_score,
            passing_score: PASSING_SCORE,
            eligible: normalized_score >= PASSING_SCORE && manual_minimum.met,
            manual_minimum,
            breakdown,
            growth,
            roadmap,
        }
    }

    pub fn assess_extension(&self, data: &ApplicantData) -> AcademicExtensionReport {
        extension::review(data, self.reference_income)
    }
}
