//! Configuration provider for visa, application-mode, and change-path records.
//!
//! The decision engine only ever sees already-parsed records through
//! [`ConfigurationProvider`]; file formats stay in [`loader`].

mod domain;
pub mod loader;
mod standard;

use std::sync::Arc;

pub use domain::{
    normalize_code, AgeRange, ApplicationMode, ApplicationModeConfig, BaseRequirements,
    ChangeConditions, ChangeDifficulty, ChangePathRule, Complexity, EducationLevel,
    ExtensionLimit, LanguageLevel, ProcessingDays, ScoringProfile, SpecialRules, VisaConfig,
};
pub use loader::CatalogLoadError;
pub use standard::{CatalogDocument, StaticCatalog};

/// Read-only access to the loaded catalog. Implementations must never mutate a record
/// once it has been handed out.
pub trait ConfigurationProvider: Send + Sync {
    fn visa_config(&self, code: &str) -> Option<Arc<VisaConfig>>;
    fn application_mode_config(&self, mode: ApplicationMode) -> Option<Arc<ApplicationModeConfig>>;
    fn change_path_rule(&self, from: &str, to: &str) -> Option<ChangePathRule>;
    fn supported_visa_types(&self) -> Vec<String>;
}
