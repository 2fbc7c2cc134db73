use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{
    normalize_code, AgeRange, ApplicationMode, ApplicationModeConfig, BaseRequirements,
    ChangeConditions, ChangeDifficulty, ChangePathRule, Complexity, EducationLevel,
    ExtensionLimit, LanguageLevel, ProcessingDays, ScoringProfile, SpecialRules, VisaConfig,
};
use super::ConfigurationProvider;

/// Serializable catalog payload, the shape external catalog files deserialize into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub visas: Vec<VisaConfig>,
    #[serde(default = "standard_mode_configs")]
    pub modes: Vec<ApplicationModeConfig>,
    #[serde(default)]
    pub change_paths: Vec<ChangePathRule>,
}

impl CatalogDocument {
    pub fn standard() -> Self {
        Self {
            visas: standard_visas(),
            modes: standard_mode_configs(),
            change_paths: standard_change_paths(),
        }
    }
}

/// In-memory configuration provider. Records are shared immutably; replacing a record
/// swaps the whole `Arc` rather than editing it in place.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    visas: BTreeMap<String, Arc<VisaConfig>>,
    modes: BTreeMap<ApplicationMode, Arc<ApplicationModeConfig>>,
    change_paths: Vec<ChangePathRule>,
}

impl StaticCatalog {
    pub fn standard() -> Self {
        Self::from_document(CatalogDocument::standard())
    }

    pub fn from_document(document: CatalogDocument) -> Self {
        let catalog = Self::default();
        let catalog = document
            .visas
            .into_iter()
            .fold(catalog, |catalog, visa| catalog.with_visa(visa));
        let catalog = document
            .modes
            .into_iter()
            .fold(catalog, |catalog, mode| catalog.with_mode_config(mode));
        document
            .change_paths
            .into_iter()
            .fold(catalog, |catalog, rule| catalog.with_change_path(rule))
    }

    pub fn with_visa(mut self, mut visa: VisaConfig) -> Self {
        visa.code = normalize_code(&visa.code);
        self.visas.insert(visa.code.clone(), Arc::new(visa));
        self
    }

    pub fn with_mode_config(mut self, config: ApplicationModeConfig) -> Self {
        self.modes.insert(config.mode, Arc::new(config));
        self
    }

    pub fn without_mode_config(mut self, mode: ApplicationMode) -> Self {
        self.modes.remove(&mode);
        self
    }

    /// Adds a change path, replacing any existing rule for the same pair.
    pub fn with_change_path(mut self, mut rule: ChangePathRule) -> Self {
        rule.from = normalize_code(&rule.from);
        rule.to = normalize_code(&rule.to);
        self.change_paths
            .retain(|existing| !(existing.from == rule.from && existing.to == rule.to));
        self.change_paths.push(rule);
        self
    }

    pub fn visa_count(&self) -> usize {
        self.visas.len()
    }
}

impl ConfigurationProvider for StaticCatalog {
    fn visa_config(&self, code: &str) -> Option<Arc<VisaConfig>> {
        self.visas.get(&normalize_code(code)).cloned()
    }

    fn application_mode_config(&self, mode: ApplicationMode) -> Option<Arc<ApplicationModeConfig>> {
        self.modes.get(&mode).cloned()
    }

    fn change_path_rule(&self, from: &str, to: &str) -> Option<ChangePathRule> {
        let from = normalize_code(from);
        let to = normalize_code(to);
        self.change_paths
            .iter()
            .find(|rule| rule.from == from && rule.to == to)
            .cloned()
    }

    fn supported_visa_types(&self) -> Vec<String> {
        self.visas.keys().cloned().collect()
    }
}

fn standard_mode_configs() -> Vec<ApplicationModeConfig> {
    ApplicationMode::ordered()
        .into_iter()
        .map(ApplicationModeConfig::standard)
        .collect()
}

fn documents(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn standard_visas() -> Vec<VisaConfig> {
    vec![
        VisaConfig {
            code: "E-1".to_string(),
            name: "Professor".to_string(),
            category: "academic".to_string(),
            profile: ScoringProfile::Academic,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::Masters),
                min_experience_years: 2.0,
                age_range: None,
                min_salary: None,
                required_documents: documents(&[
                    "passport",
                    "degree_certificate",
                    "employment_contract",
                    "career_certificate",
                    "research_record",
                ]),
            },
            supported_modes: ApplicationMode::ordered().to_vec(),
            complexity: Complexity::High,
            processing_days: ProcessingDays { min: 30, max: 60 },
            special_rules: Some(SpecialRules {
                min_points: None,
                extension_limit: Some(ExtensionLimit {
                    max_extensions: 5,
                    max_stay_years: 10.0,
                }),
            }),
        },
        VisaConfig {
            code: "E-2".to_string(),
            name: "Foreign Language Instructor".to_string(),
            category: "teaching".to_string(),
            profile: ScoringProfile::Instructor,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::Bachelor),
                min_experience_years: 0.0,
                age_range: Some(AgeRange { min: 20, max: 62 }),
                min_salary: None,
                required_documents: documents(&[
                    "passport",
                    "degree_certificate",
                    "criminal_record_check",
                    "health_certificate",
                    "employment_contract",
                ]),
            },
            supported_modes: ApplicationMode::ordered().to_vec(),
            complexity: Complexity::Medium,
            processing_days: ProcessingDays { min: 14, max: 30 },
            special_rules: Some(SpecialRules {
                min_points: None,
                extension_limit: Some(ExtensionLimit {
                    max_extensions: 4,
                    max_stay_years: 8.0,
                }),
            }),
        },
        VisaConfig {
            code: "E-7".to_string(),
            name: "Specially Designated Activities".to_string(),
            category: "professional".to_string(),
            profile: ScoringProfile::Professional,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::Bachelor),
                min_experience_years: 1.0,
                age_range: None,
                min_salary: Some(35_240_000.0),
                required_documents: documents(&[
                    "passport",
                    "degree_certificate",
                    "employment_contract",
                    "career_certificate",
                    "business_registration",
                ]),
            },
            supported_modes: ApplicationMode::ordered().to_vec(),
            complexity: Complexity::High,
            processing_days: ProcessingDays { min: 30, max: 90 },
            special_rules: Some(SpecialRules {
                min_points: None,
                extension_limit: Some(ExtensionLimit {
                    max_extensions: 6,
                    max_stay_years: 10.0,
                }),
            }),
        },
        VisaConfig {
            code: "F-2-7".to_string(),
            name: "Points-Based Residence".to_string(),
            category: "residence".to_string(),
            profile: ScoringProfile::PointsBased,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::Bachelor),
                min_experience_years: 0.0,
                age_range: None,
                min_salary: None,
                required_documents: documents(&[
                    "passport",
                    "alien_registration_card",
                    "income_proof",
                    "tax_certificate",
                    "points_evidence",
                ]),
            },
            supported_modes: vec![ApplicationMode::New, ApplicationMode::Change],
            complexity: Complexity::VeryHigh,
            processing_days: ProcessingDays { min: 60, max: 120 },
            special_rules: Some(SpecialRules {
                min_points: Some(80.0),
                extension_limit: None,
            }),
        },
        VisaConfig {
            code: "D-2".to_string(),
            name: "Student".to_string(),
            category: "study".to_string(),
            profile: ScoringProfile::Student,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::HighSchool),
                min_experience_years: 0.0,
                age_range: None,
                min_salary: None,
                required_documents: documents(&[
                    "passport",
                    "admission_letter",
                    "financial_proof",
                    "academic_transcript",
                ]),
            },
            supported_modes: vec![ApplicationMode::New, ApplicationMode::Extension],
            complexity: Complexity::Low,
            processing_days: ProcessingDays { min: 7, max: 21 },
            special_rules: Some(SpecialRules {
                min_points: None,
                extension_limit: Some(ExtensionLimit {
                    max_extensions: 8,
                    max_stay_years: 8.0,
                }),
            }),
        },
        VisaConfig {
            code: "D-10".to_string(),
            name: "Job Seeker".to_string(),
            category: "job-seeking".to_string(),
            profile: ScoringProfile::JobSeeker,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::Bachelor),
                min_experience_years: 0.0,
                age_range: None,
                min_salary: None,
                required_documents: documents(&[
                    "passport",
                    "degree_certificate",
                    "job_search_plan",
                    "financial_proof",
                ]),
            },
            supported_modes: ApplicationMode::ordered().to_vec(),
            complexity: Complexity::Medium,
            processing_days: ProcessingDays { min: 14, max: 30 },
            special_rules: Some(SpecialRules {
                min_points: None,
                extension_limit: Some(ExtensionLimit {
                    max_extensions: 2,
                    max_stay_years: 2.0,
                }),
            }),
        },
        VisaConfig {
            code: "C-4".to_string(),
            name: "Short-Term Employment".to_string(),
            category: "short-term".to_string(),
            profile: ScoringProfile::Generic,
            base_requirements: BaseRequirements {
                min_education: Some(EducationLevel::HighSchool),
                min_experience_years: 0.0,
                age_range: None,
                min_salary: None,
                required_documents: documents(&["passport", "employment_contract"]),
            },
            supported_modes: vec![ApplicationMode::New],
            complexity: Complexity::Low,
            processing_days: ProcessingDays { min: 7, max: 14 },
            special_rules: None,
        },
    ]
}

fn standard_change_paths() -> Vec<ChangePathRule> {
    vec![
        ChangePathRule {
            from: "D-2".to_string(),
            to: "E-7".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_education: Some(EducationLevel::Bachelor),
                requires_job_offer: true,
                min_salary: Some(26_000_000.0),
                min_stay_months: None,
                min_language: Some(LanguageLevel::Intermediate),
            },
            difficulty: ChangeDifficulty::Moderate,
            success_rate: 0.72,
        },
        ChangePathRule {
            from: "D-2".to_string(),
            to: "D-10".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_education: Some(EducationLevel::Bachelor),
                ..ChangeConditions::default()
            },
            difficulty: ChangeDifficulty::Easy,
            success_rate: 0.9,
        },
        ChangePathRule {
            from: "D-2".to_string(),
            to: "E-1".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_education: Some(EducationLevel::Masters),
                requires_job_offer: true,
                ..ChangeConditions::default()
            },
            difficulty: ChangeDifficulty::Hard,
            success_rate: 0.4,
        },
        ChangePathRule {
            from: "D-10".to_string(),
            to: "E-7".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_education: Some(EducationLevel::Bachelor),
                requires_job_offer: true,
                min_salary: Some(26_000_000.0),
                ..ChangeConditions::default()
            },
            difficulty: ChangeDifficulty::Moderate,
            success_rate: 0.68,
        },
        ChangePathRule {
            from: "E-2".to_string(),
            to: "E-1".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_education: Some(EducationLevel::Masters),
                requires_job_offer: true,
                min_stay_months: Some(12),
                ..ChangeConditions::default()
            },
            difficulty: ChangeDifficulty::Hard,
            success_rate: 0.45,
        },
        ChangePathRule {
            from: "E-7".to_string(),
            to: "F-2-7".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_stay_months: Some(36),
                min_language: Some(LanguageLevel::Intermediate),
                ..ChangeConditions::default()
            },
            difficulty: ChangeDifficulty::Hard,
            success_rate: 0.55,
        },
        ChangePathRule {
            from: "E-9".to_string(),
            to: "E-7".to_string(),
            allowed: true,
            conditions: ChangeConditions {
                min_salary: Some(26_000_000.0),
                min_stay_months: Some(48),
                min_language: Some(LanguageLevel::Intermediate),
                ..ChangeConditions::default()
            },
            difficulty: ChangeDifficulty::Hard,
            success_rate: 0.35,
        },
        ChangePathRule {
            from: "C-4".to_string(),
            to: "E-7".to_string(),
            allowed: false,
            conditions: ChangeConditions::default(),
            difficulty: ChangeDifficulty::VeryHard,
            success_rate: 0.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_exposes_every_mode_config() {
        let catalog = StaticCatalog::standard();
        for mode in ApplicationMode::ordered() {
            let config = catalog
                .application_mode_config(mode)
                .expect("mode config present");
            let total: f64 = config.scoring_weights.values().sum();
            assert_eq!(total, 100.0, "{mode} weights should sum to 100");
            assert_eq!(config.passing_score, mode.default_passing_score());
        }
    }

    #[test]
    fn lookups_ignore_code_case_and_whitespace() {
        let catalog = StaticCatalog::standard();
        assert!(catalog.visa_config(" e-1 ").is_some());
        assert!(catalog.change_path_rule("d-2", "e-7").is_some());
        assert!(catalog.change_path_rule("C-3", "E-7").is_none());
    }

    #[test]
    fn replacing_a_visa_swaps_the_whole_record() {
        let catalog = StaticCatalog::standard();
        let original = catalog.visa_config("E-2").expect("E-2 present");

        let mut replacement = (*original).clone();
        replacement.complexity = Complexity::VeryHigh;
        let reloaded = catalog.clone().with_visa(replacement);

        assert_eq!(original.complexity, Complexity::Medium);
        assert_eq!(
            reloaded.visa_config("E-2").expect("E-2 present").complexity,
            Complexity::VeryHigh
        );
        assert_eq!(
            catalog.visa_config("E-2").expect("E-2 present").complexity,
            Complexity::Medium
        );
    }
}
