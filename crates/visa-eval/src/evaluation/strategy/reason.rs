use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::error;

use crate::evaluation::data::ApplicantData;

const DOCUMENT_BONUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCategory {
    Employment,
    Education,
    Family,
    Investment,
    Other,
}

impl ReasonCategory {
    pub const fn base_score(self) -> f64 {
        match self {
            Self::Employment => 90.0,
            Self::Education => 85.0,
            Self::Family => 80.0,
            Self::Investment => 75.0,
            Self::Other => 40.0,
        }
    }
}

/// Evaluated top to bottom; the first rule whose pattern matches wins. Patterns are
/// anchored on word boundaries so short stems never match inside unrelated words.
const PATTERNS: [(ReasonCategory, &str); 4] = [
    (
        ReasonCategory::Employment,
        r"(?i)\b(job offers?|employ(ment|er|ers|ed)|hired|careers?|work(s|ing|ed)?)\b",
    ),
    (
        ReasonCategory::Education,
        r"(?i)\b(degrees?|graduate|universit(y|ies)|study|studies|studying|research|schools?)\b",
    ),
    (
        ReasonCategory::Family,
        r"(?i)\b(marriage|married|spouses?|family|child|children|parents?)\b",
    ),
    (
        ReasonCategory::Investment,
        r"(?i)\b(invest(ing|ment|ments|or|ors)?|business(es)?|start-?ups?|capital|company)\b",
    ),
];

struct ReasonRule {
    category: ReasonCategory,
    pattern: Regex,
}

static RULES: LazyLock<Vec<ReasonRule>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(category, pattern)| match Regex::new(pattern) {
            Ok(pattern) => Some(ReasonRule {
                category: *category,
                pattern,
            }),
            Err(error) => {
                error!(category = ?category, %error, "reason pattern failed to compile");
                None
            }
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonClassification {
    pub category: ReasonCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
    pub base_score: f64,
    pub document_bonus: f64,
    pub score: f64,
}

pub fn classify_reason(reason: &str, has_documents: bool) -> ReasonClassification {
    let matched = RULES.iter().find_map(|rule| {
        rule.pattern
            .find(reason)
            .map(|found| (rule.category, found.as_str().to_lowercase()))
    });

    let (category, matched_keyword) = match matched {
        Some((category, keyword)) => (category, Some(keyword)),
        None => (ReasonCategory::Other, None),
    };
    let document_bonus = if has_documents { DOCUMENT_BONUS } else { 0.0 };

    ReasonClassification {
        category,
        matched_keyword,
        base_score: category.base_score(),
        document_bonus,
        score: (category.base_score() + document_bonus).min(100.0),
    }
}

pub(super) fn classify_applicant_reason(data: &ApplicantData) -> ReasonClassification {
    classify_reason(data.text("reason").unwrap_or(""), data.flag("reason_documents"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_wins() {
        let classification = classify_reason("I finished my degree and got a job offer", false);
        assert_eq!(classification.category, ReasonCategory::Employment);
        assert_eq!(classification.matched_keyword.as_deref(), Some("job offer"));
        assert_eq!(classification.score, 90.0);
    }

    #[test]
    fn unmatched_text_defaults_to_other() {
        let classification = classify_reason("personal preference", true);
        assert_eq!(classification.category, ReasonCategory::Other);
        assert_eq!(classification.score, 50.0);
    }

    #[test]
    fn document_bonus_is_capped() {
        let classification = classify_reason("Employment transfer", true);
        assert_eq!(classification.score, 100.0);
    }

    #[test]
    fn every_pattern_compiles() {
        assert_eq!(RULES.len(), PATTERNS.len());
    }

    #[test]
    fn keywords_only_match_whole_words() {
        let studies =
            classify_reason("I want to continue my graduate studies in computer networks", false);
        assert_eq!(studies.category, ReasonCategory::Education);
        assert_eq!(studies.matched_keyword.as_deref(), Some("graduate"));
        assert_eq!(studies.score, 85.0);

        let transparent = classify_reason("A transparent preschooler workflow", false);
        assert_eq!(transparent.category, ReasonCategory::Other);
        assert_eq!(transparent.matched_keyword, None);
    }

    #[test]
    fn inflected_forms_still_match() {
        assert_eq!(
            classify_reason("My spouse and our children live here", false).category,
            ReasonCategory::Family
        );
        assert_eq!(
            classify_reason("Opening a Start-up with local investors", false).category,
            ReasonCategory::Investment
        );
        assert_eq!(
            classify_reason("I have been working here for years", false).category,
            ReasonCategory::Employment
        );
    }
}
