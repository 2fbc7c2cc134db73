use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{EducationLevel, LanguageLevel};

/// Applicant-supplied record. Field values stay as submitted; typed accessors read them
/// leniently (numeric strings count as numbers, `null` counts as absent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantData(Map<String, Value>);

impl ApplicantData {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.get(first)?;
        for segment in rest {
            current = current.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(as_number)
    }

    pub fn number_at(&self, path: &[&str]) -> Option<f64> {
        self.path(path).and_then(as_number)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.path(path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn flag(&self, field: &str) -> bool {
        self.get(field).map(as_flag).unwrap_or(false)
    }

    pub fn flag_at(&self, path: &[&str]) -> bool {
        self.path(path).map(as_flag).unwrap_or(false)
    }

    pub fn list_at(&self, path: &[&str]) -> &[Value] {
        self.path(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn education(&self) -> Option<EducationLevel> {
        self.text("education").and_then(EducationLevel::parse)
    }

    pub fn language(&self) -> Option<LanguageLevel> {
        self.get("language").and_then(as_language)
    }

    /// Submitted documents, accepting either bare names or `{name, verified, ...}` objects.
    pub fn documents(&self) -> Vec<SubmittedDocument> {
        self.list_at(&["documents"])
            .iter()
            .filter_map(SubmittedDocument::from_value)
            .collect()
    }

    pub fn has_document(&self, name: &str) -> bool {
        let wanted = normalize_document_name(name);
        self.documents().iter().any(|document| document.name == wanted)
    }
}

pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        Value::Number(number) => number.as_f64().map(|n| n > 0.0).unwrap_or(false),
        _ => false,
    }
}

pub(crate) fn as_language(value: &Value) -> Option<LanguageLevel> {
    match value {
        Value::String(raw) => LanguageLevel::parse(raw),
        Value::Number(number) => number
            .as_u64()
            .map(|level| LanguageLevel::from_test_level(level.min(6) as u8)),
        _ => None,
    }
}

pub fn normalize_document_name(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// One document reference from the applicant's `documents` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedDocument {
    pub name: String,
    pub verified: bool,
    pub apostille: bool,
    pub notarized: bool,
}

impl SubmittedDocument {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) if !name.trim().is_empty() => Some(Self {
                name: normalize_document_name(name),
                verified: false,
                apostille: false,
                notarized: false,
            }),
            Value::Object(fields) => {
                let name = fields.get("name").and_then(Value::as_str)?;
                let submitted = fields.get("submitted").map(as_flag).unwrap_or(true);
                if !submitted || name.trim().is_empty() {
                    return None;
                }
                let flag = |key: &str| fields.get(key).map(as_flag).unwrap_or(false);
                Some(Self {
                    name: normalize_document_name(name),
                    verified: flag("verified"),
                    apostille: flag("apostille"),
                    notarized: flag("notarized"),
                })
            }
            _ => None,
        }
    }
}
