use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three ways an application can be filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    New,
    Extension,
    Change,
}

impl ApplicationMode {
    pub const fn ordered() -> [Self; 3] {
        [Self::New, Self::Extension, Self::Change]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Extension => "extension",
            Self::Change => "change",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" | "initial" => Some(Self::New),
            "extension" | "extend" | "renewal" => Some(Self::Extension),
            "change" | "status_change" | "status-change" => Some(Self::Change),
            _ => None,
        }
    }

    pub const fn default_passing_score(self) -> f64 {
        match self {
            Self::New => 70.0,
            Self::Extension => 65.0,
            Self::Change => 60.0,
        }
    }
}

impl fmt::Display for ApplicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Processing complexity tier of a visa category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Complexity {
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Low => 0.7,
            Self::Medium => 1.0,
            Self::High => 1.3,
            Self::VeryHigh => 1.5,
        }
    }

    /// One tier harder, saturating at `very-high`.
    pub const fn promoted(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::VeryHigh => Self::VeryHigh,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

/// Ranked education scale used by every education comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Masters,
    Doctorate,
}

impl EducationLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::HighSchool,
            Self::Associate,
            Self::Bachelor,
            Self::Masters,
            Self::Doctorate,
        ]
    }

    pub const fn ordinal(self) -> u8 {
        match self {
            Self::HighSchool => 0,
            Self::Associate => 1,
            Self::Bachelor => 2,
            Self::Masters => 3,
            Self::Doctorate => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighSchool => "high school diploma",
            Self::Associate => "associate degree",
            Self::Bachelor => "bachelor's degree",
            Self::Masters => "master's degree",
            Self::Doctorate => "doctorate",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::HighSchool => Some(Self::Associate),
            Self::Associate => Some(Self::Bachelor),
            Self::Bachelor => Some(Self::Masters),
            Self::Masters => Some(Self::Doctorate),
            Self::Doctorate => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' ', '\''], "_");
        match normalized.as_str() {
            "high_school" | "highschool" | "secondary" | "diploma" => Some(Self::HighSchool),
            "associate" | "associates" | "associate_degree" | "college" => Some(Self::Associate),
            "bachelor" | "bachelors" | "bachelor_degree" | "ba" | "bs" | "bsc" => {
                Some(Self::Bachelor)
            }
            "master" | "masters" | "master_degree" | "ma" | "ms" | "msc" | "mba" => {
                Some(Self::Masters)
            }
            "doctorate" | "doctoral" | "phd" | "ph.d" | "ph.d." | "doctor" => Some(Self::Doctorate),
            _ => None,
        }
    }

    /// True when `self` is at least as high as `required` on the ranked scale.
    pub fn meets(self, required: Self) -> bool {
        self.ordinal() >= required.ordinal()
    }
}

/// Language proficiency scale shared by change-path conditions and academic scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageLevel {
    None,
    Basic,
    Intermediate,
    Advanced,
    Native,
}

impl LanguageLevel {
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Basic),
            Self::Basic => Some(Self::Intermediate),
            Self::Intermediate => Some(Self::Advanced),
            Self::Advanced => Some(Self::Native),
            Self::Native => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if let Ok(level) = normalized.trim_start_matches("topik").trim().parse::<u8>() {
            return Some(Self::from_test_level(level));
        }
        match normalized.as_str() {
            "none" | "no" => Some(Self::None),
            "basic" | "beginner" | "elementary" => Some(Self::Basic),
            "intermediate" | "conversational" => Some(Self::Intermediate),
            "advanced" | "fluent" | "business" => Some(Self::Advanced),
            "native" | "bilingual" => Some(Self::Native),
            _ => None,
        }
    }

    /// Maps a 0-6 proficiency test level onto the scale.
    pub const fn from_test_level(level: u8) -> Self {
        match level {
            0 => Self::None,
            1 | 2 => Self::Basic,
            3 | 4 => Self::Intermediate,
            _ => Self::Advanced,
        }
    }
}

/// Which scoring formulas a visa category uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringProfile {
    Academic,
    Instructor,
    Professional,
    PointsBased,
    Student,
    JobSeeker,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub fn contains(&self, age: f64) -> bool {
        age >= self.min as f64 && age <= self.max as f64
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseRequirements {
    #[serde(default)]
    pub min_education: Option<EducationLevel>,
    #[serde(default)]
    pub min_experience_years: f64,
    #[serde(default)]
    pub age_range: Option<AgeRange>,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub required_documents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingDays {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtensionLimit {
    pub max_extensions: u32,
    pub max_stay_years: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialRules {
    #[serde(default)]
    pub min_points: Option<f64>,
    #[serde(default)]
    pub extension_limit: Option<ExtensionLimit>,
}

/// Immutable per-visa configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaConfig {
    pub code: String,
    pub name: String,
    pub category: String,
    pub profile: ScoringProfile,
    #[serde(default)]
    pub base_requirements: BaseRequirements,
    pub supported_modes: Vec<ApplicationMode>,
    pub complexity: Complexity,
    pub processing_days: ProcessingDays,
    #[serde(default)]
    pub special_rules: Option<SpecialRules>,
}

impl VisaConfig {
    pub fn supports(&self, mode: ApplicationMode) -> bool {
        self.supported_modes.contains(&mode)
    }

    pub fn min_points(&self) -> Option<f64> {
        self.special_rules.as_ref().and_then(|rules| rules.min_points)
    }

    pub fn extension_limit(&self) -> Option<ExtensionLimit> {
        self.special_rules
            .as_ref()
            .and_then(|rules| rules.extension_limit)
    }
}

/// Immutable per-mode scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationModeConfig {
    pub mode: ApplicationMode,
    pub passing_score: f64,
    pub scoring_weights: BTreeMap<String, f64>,
}

impl ApplicationModeConfig {
    pub fn weight(&self, component: &str) -> Option<f64> {
        self.scoring_weights.get(component).copied()
    }

    pub fn standard(mode: ApplicationMode) -> Self {
        let weights: &[(&str, f64)] = match mode {
            ApplicationMode::New => &[("eligibility", 40.0), ("documents", 30.0), ("expertise", 30.0)],
            ApplicationMode::Extension => &[
                ("stay_history", 40.0),
                ("performance", 30.0),
                ("contract", 20.0),
                ("documents", 10.0),
            ],
            ApplicationMode::Change => &[
                ("changeability", 30.0),
                ("stay_history", 20.0),
                ("requirements", 30.0),
                ("reason", 10.0),
                ("documents", 10.0),
            ],
        };

        Self {
            mode,
            passing_score: mode.default_passing_score(),
            scoring_weights: weights
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDifficulty {
    Easy,
    Moderate,
    Hard,
    VeryHard,
}

/// Structured conditions attached to a change path; absent fields impose nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeConditions {
    #[serde(default)]
    pub min_education: Option<EducationLevel>,
    #[serde(default)]
    pub requires_job_offer: bool,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub min_stay_months: Option<u32>,
    #[serde(default)]
    pub min_language: Option<LanguageLevel>,
}

/// Whether and how one visa may be changed into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePathRule {
    pub from: String,
    pub to: String,
    pub allowed: bool,
    #[serde(default)]
    pub conditions: ChangeConditions,
    pub difficulty: ChangeDifficulty,
    pub success_rate: f64,
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
