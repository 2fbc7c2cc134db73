use serde::Serialize;

use super::scoring::{
    experience_points, language_points, normalize, qualification_points, AcademicProfile,
    AcademicTitle, PointBreakdown, EXPERIENCE_BANDS, PASSING_SCORE, RESEARCH_CAP,
};
use crate::catalog::{EducationLevel, LanguageLevel};
use crate::evaluation::context::round2;

const PRIORITY_ACTIONS: usize = 3;
const PUBLICATION_STEP: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthFactor {
    EducationUpgrade,
    ExperienceGap,
    TitlePromotion,
    PublicationGrowth,
    LanguageUpgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub const fn weight(self) -> f64 {
        match self {
            Self::Easy => 1.0,
            Self::Moderate => 1.5,
            Self::Hard => 2.5,
        }
    }
}

/// One improvable factor with its achievable gain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthOpportunity {
    pub factor: GrowthFactor,
    pub action: String,
    pub points: f64,
    pub normalized_points: f64,
    pub months: u32,
    pub difficulty: Difficulty,
}

impl GrowthOpportunity {
    fn new(
        factor: GrowthFactor,
        action: String,
        points: f64,
        months: u32,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            factor,
            action,
            points,
            normalized_points: normalize(points),
            months,
            difficulty,
        }
    }

    /// Gain per unit of effort; higher ranks first.
    pub fn efficiency(&self) -> f64 {
        self.points / self.difficulty.weight()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthProjection {
    pub opportunities: Vec<GrowthOpportunity>,
    pub priority_actions: Vec<GrowthOpportunity>,
    /// Normalized score if every opportunity were realised.
    pub potential_score: f64,
}

pub fn project(
    profile: &AcademicProfile,
    breakdown: &PointBreakdown,
    current_score: f64,
) -> GrowthProjection {
    let mut opportunities: Vec<GrowthOpportunity> = [
        education_upgrade(profile),
        experience_gap(profile),
        title_promotion(profile, breakdown),
        publication_growth(breakdown),
        language_upgrade(profile),
    ]
    .into_iter()
    .flatten()
    .filter(|opportunity| opportunity.points > 0.0)
    .collect();

    opportunities.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()));

    let potential_score = round2(
        (current_score
            + opportunities
                .iter()
                .map(|opportunity| opportunity.normalized_points)
                .sum::<f64>())
        .min(100.0),
    );

    GrowthProjection {
        priority_actions: opportunities.iter().take(PRIORITY_ACTIONS).cloned().collect(),
        opportunities,
        potential_score,
    }
}

fn education_upgrade(profile: &AcademicProfile) -> Option<GrowthOpportunity> {
    let current = profile.education.unwrap_or(EducationLevel::HighSchool);
    let next = current.next()?;
    let (months, difficulty) = if next == EducationLevel::Doctorate {
        (36, Difficulty::Hard)
    } else {
        (24, Difficulty::Moderate)
    };
    Some(GrowthOpportunity::new(
        GrowthFactor::EducationUpgrade,
        format!("Complete a {}", next.label()),
        qualification_points(next) - qualification_points(current),
        months,
        difficulty,
    ))
}

fn experience_gap(profile: &AcademicProfile) -> Option<GrowthOpportunity> {
    let years = profile.experience_years;
    let (threshold, _) = EXPERIENCE_BANDS
        .iter()
        .rev()
        .find(|(minimum, _)| *minimum > years)?;
    let gain = experience_points(*threshold, profile.title) - experience_points(years, profile.title);
    let months = ((threshold - years) * 12.0).ceil().max(1.0) as u32;
    Some(GrowthOpportunity::new(
        GrowthFactor::ExperienceGap,
        format!("Reach {threshold} years of teaching or research experience"),
        gain,
        months,
        Difficulty::Easy,
    ))
}

fn title_promotion(profile: &AcademicProfile, breakdown: &PointBreakdown) -> Option<GrowthOpportunity> {
    let (next, months, difficulty) = match profile.title {
        None => (AcademicTitle::Lecturer, 12, Difficulty::Moderate),
        Some(title) => (title.next()?, 24, Difficulty::Hard),
    };
    let promoted = experience_points(profile.experience_years, Some(next));
    Some(GrowthOpportunity::new(
        GrowthFactor::TitlePromotion,
        format!("Obtain an appointment as {}", next.label()),
        promoted - breakdown.experience,
        months,
        difficulty,
    ))
}

fn publication_growth(breakdown: &PointBreakdown) -> Option<GrowthOpportunity> {
    let headroom = RESEARCH_CAP - breakdown.research;
    (headroom > 0.0).then(|| {
        let gain = headroom.min(PUBLICATION_STEP);
        GrowthOpportunity::new(
            GrowthFactor::PublicationGrowth,
            format!("Publish {gain} more peer-reviewed papers"),
            gain,
            12,
            Difficulty::Moderate,
        )
    })
}

fn language_upgrade(profile: &AcademicProfile) -> Option<GrowthOpportunity> {
    let current = profile.language.unwrap_or(LanguageLevel::None);
    let next = current.next()?;
    let difficulty = if next <= LanguageLevel::Intermediate {
        Difficulty::Easy
    } else {
        Difficulty::Moderate
    };
    Some(GrowthOpportunity::new(
        GrowthFactor::LanguageUpgrade,
        format!("Certify {} language proficiency", language_label(next)),
        language_points(next) - language_points(current),
        6,
        difficulty,
    ))
}

fn language_label(level: LanguageLevel) -> &'static str {
    match level {
        LanguageLevel::None => "no",
        LanguageLevel::Basic => "basic",
        LanguageLevel::Intermediate => "intermediate",
        LanguageLevel::Advanced => "advanced",
        LanguageLevel::Native => "native-level",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapPhase {
    pub start_month: u32,
    pub end_month: u32,
    pub gain: f64,
    pub target_score: f64,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementRoadmap {
    pub current_score: f64,
    pub gap: f64,
    pub phases: Vec<RoadmapPhase>,
}

/// Phase windows in months with the share of the gap each closes.
const PHASES: [(u32, u32, f64); 3] = [(0, 3, 0.3), (3, 6, 0.4), (6, 12, 0.3)];

pub fn roadmap(current_score: f64, opportunities: &[GrowthOpportunity]) -> ImprovementRoadmap {
    let gap = round2((PASSING_SCORE - current_score).max(0.0));
    let mut claimed = 0.0;

    let phases = PHASES
        .iter()
        .map(|(start, end, share)| {
            let gain = round2(gap * share);
            claimed += gap * share;
            RoadmapPhase {
                start_month: *start,
                end_month: *end,
                gain,
                target_score: round2((current_score + claimed).min(100.0)),
                actions: opportunities
                    .iter()
                    .filter(|opportunity| {
                        let months = opportunity.months;
                        months > *start && months <= *end
                    })
                    .map(|opportunity| opportunity.action.clone())
                    .collect(),
            }
        })
        .collect();

    ImprovementRoadmap {
        current_score,
        gap,
        phases,
    }
}
