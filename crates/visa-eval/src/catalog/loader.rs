use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::domain::normalize_code;
use super::standard::{CatalogDocument, StaticCatalog};

/// Failure while reading an external catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("unable to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("catalog rejected: {0}")]
    Invalid(String),
}

impl StaticCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogLoadError> {
        let document: CatalogDocument = serde_yaml::from_str(raw)?;
        validate_document(&document)?;
        Ok(Self::from_document(document))
    }
}

fn validate_document(document: &CatalogDocument) -> Result<(), CatalogLoadError> {
    if document.visas.is_empty() {
        return Err(CatalogLoadError::Invalid(
            "at least one visa must be configured".to_string(),
        ));
    }

    let mut seen = BTreeSet::new();
    for visa in &document.visas {
        let code = normalize_code(&visa.code);
        if !seen.insert(code.clone()) {
            return Err(CatalogLoadError::Invalid(format!(
                "visa {code} is configured more than once"
            )));
        }
        if visa.supported_modes.is_empty() {
            return Err(CatalogLoadError::Invalid(format!(
                "visa {code} supports no application mode"
            )));
        }
        if visa.processing_days.min > visa.processing_days.max {
            return Err(CatalogLoadError::Invalid(format!(
                "visa {code} has processing_days.min above processing_days.max"
            )));
        }
    }

    for rule in &document.change_paths {
        if !(0.0..=1.0).contains(&rule.success_rate) {
            return Err(CatalogLoadError::Invalid(format!(
                "change path {} -> {} has success_rate outside 0..=1",
                rule.from, rule.to
            )));
        }
    }

    Ok(())
}
