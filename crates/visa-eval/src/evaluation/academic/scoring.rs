use serde::{Deserialize, Serialize};

use crate::catalog::{EducationLevel, LanguageLevel};
use crate::evaluation::context::round2;
use crate::evaluation::data::ApplicantData;

pub const MAX_RAW_POINTS: f64 = 110.0;
pub const PASSING_SCORE: f64 = 70.0;
pub const MANUAL_MINIMUM: f64 = 55.0;

pub(super) const EXPERIENCE_CAP: f64 = 25.0;
pub(super) const RESEARCH_CAP: f64 = 25.0;

/// Experience bands as `(minimum years, points)`, highest first.
pub(super) const EXPERIENCE_BANDS: [(f64, f64); 5] =
    [(10.0, 20.0), (7.0, 16.0), (5.0, 12.0), (3.0, 8.0), (1.0, 4.0)];

/// Academic rank, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicTitle {
    Lecturer,
    AssistantProfessor,
    AssociateProfessor,
    Professor,
}

impl AcademicTitle {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "lecturer" | "instructor" | "adjunct" => Some(Self::Lecturer),
            "assistant_professor" | "assistant" => Some(Self::AssistantProfessor),
            "associate_professor" | "associate" => Some(Self::AssociateProfessor),
            "professor" | "full_professor" | "chair_professor" => Some(Self::Professor),
            _ => None,
        }
    }

    pub const fn bonus(self) -> f64 {
        match self {
            Self::Professor => 5.0,
            Self::AssociateProfessor => 4.0,
            Self::AssistantProfessor => 3.0,
            Self::Lecturer => 1.0,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Lecturer => Some(Self::AssistantProfessor),
            Self::AssistantProfessor => Some(Self::AssociateProfessor),
            Self::AssociateProfessor => Some(Self::Professor),
            Self::Professor => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lecturer => "lecturer",
            Self::AssistantProfessor => "assistant professor",
            Self::AssociateProfessor => "associate professor",
            Self::Professor => "professor",
        }
    }

    /// Share of the reference income an appointee at this rank must earn.
    pub const fn income_fraction(self) -> f64 {
        match self {
            Self::Professor => 1.0,
            Self::AssociateProfessor => 0.9,
            Self::AssistantProfessor => 0.8,
            Self::Lecturer => 0.7,
        }
    }
}

/// Applicant facts the point pipeline reads, pulled once from the raw record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcademicProfile {
    pub education: Option<EducationLevel>,
    pub experience_years: f64,
    pub title: Option<AcademicTitle>,
    pub publications: f64,
    pub sci_publications: f64,
    pub language: Option<LanguageLevel>,
    pub age: Option<f64>,
    pub institution_tier: Option<u8>,
}

impl AcademicProfile {
    pub fn from_data(data: &ApplicantData) -> Self {
        Self {
            education: data.education(),
            experience_years: data
                .number("experience_years")
                .or_else(|| data.number("experience"))
                .unwrap_or(0.0)
                .max(0.0),
            title: data
                .text("title")
                .or_else(|| data.text("position"))
                .and_then(AcademicTitle::parse),
            publications: data.number("publications").unwrap_or(0.0).max(0.0),
            sci_publications: data.number("sci_publications").unwrap_or(0.0).max(0.0),
            language: data.language(),
            age: data.number("age"),
            institution_tier: data
                .number("institution_tier")
                .filter(|tier| *tier >= 0.0)
                .map(|tier| tier.round().min(u8::MAX as f64) as u8),
        }
    }
}

/// Six independently capped sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointBreakdown {
    pub qualification: f64,
    pub experience: f64,
    pub research: f64,
    pub language: f64,
    pub age: f64,
    pub institution: f64,
}

impl PointBreakdown {
    pub fn score(profile: &AcademicProfile) -> Self {
        Self {
            qualification: profile.education.map(qualification_points).unwrap_or(0.0),
            experience: experience_points(profile.experience_years, profile.title),
            research: research_points(profile.publications, profile.sci_publications),
            language: profile.language.map(language_points).unwrap_or(0.0),
            age: profile.age.map(age_points).unwrap_or(0.0),
            institution: profile.institution_tier.map(institution_points).unwrap_or(0.0),
        }
    }

    pub fn total(&self) -> f64 {
        self.qualification + self.experience + self.research + self.language + self.age + self.institution
    }

    /// Sub-total checked against the manual minimum.
    pub fn core_total(&self) -> f64 {
        self.qualification + self.experience + self.research
    }

    pub fn normalized(&self) -> f64 {
        normalize(self.total())
    }
}

pub fn normalize(raw: f64) -> f64 {
    round2((raw / MAX_RAW_POINTS * 100.0).clamp(0.0, 100.0))
}

pub const fn qualification_points(level: EducationLevel) -> f64 {
    match level {
        EducationLevel::Doctorate => 30.0,
        EducationLevel::Masters => 22.0,
        EducationLevel::Bachelor => 12.0,
        EducationLevel::Associate => 5.0,
        EducationLevel::HighSchool => 0.0,
    }
}

pub fn experience_points(years: f64, title: Option<AcademicTitle>) -> f64 {
    let band = EXPERIENCE_BANDS
        .iter()
        .find(|(minimum, _)| years >= *minimum)
        .map(|(_, points)| *points)
        .unwrap_or(0.0);
    (band + title.map(AcademicTitle::bonus).unwrap_or(0.0)).min(EXPERIENCE_CAP)
}

pub fn research_points(publications: f64, sci_publications: f64) -> f64 {
    (publications + sci_publications).min(RESEARCH_CAP)
}

pub const fn language_points(level: LanguageLevel) -> f64 {
    match level {
        LanguageLevel::Native => 10.0,
        LanguageLevel::Advanced => 8.0,
        LanguageLevel::Intermediate => 5.0,
        LanguageLevel::Basic => 2.0,
        LanguageLevel::None => 0.0,
    }
}

pub fn age_points(age: f64) -> f64 {
    if age <= 35.0 {
        10.0
    } else if age <= 45.0 {
        8.0
    } else if age <= 55.0 {
        5.0
    } else {
        2.0
    }
}

pub const fn institution_points(tier: u8) -> f64 {
    match tier {
        1 => 10.0,
        2 => 7.0,
        3 => 4.0,
        _ => 2.0,
    }
}
