use serde::Serialize;

use super::scoring::AcademicTitle;
use crate::evaluation::context::round2;
use crate::evaluation::data::ApplicantData;

const TAX_PASS: f64 = 60.0;
const LATE_PAYMENT_PENALTY: f64 = 10.0;
const DELINQUENCY_PENALTY: f64 = 40.0;
const RECENT_ACTIVITY_MONTHS: f64 = 12.0;
const PARTIAL_ACTIVITY_CREDIT: f64 = 60.0;

/// Outcome of one threshold check; `score` is partial credit on 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCheck {
    pub passed: bool,
    pub score: f64,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicExtensionReport {
    pub income: ThresholdCheck,
    pub tax_compliance: ThresholdCheck,
    pub recent_activity: ThresholdCheck,
    pub passed: bool,
    pub score: f64,
}

pub(super) fn review(data: &ApplicantData, reference_income: f64) -> AcademicExtensionReport {
    let income = income_floor(data, reference_income);
    let tax_compliance = tax_compliance(data);
    let recent_activity = recent_activity(data);

    AcademicExtensionReport {
        passed: income.passed && tax_compliance.passed && recent_activity.passed,
        score: round2((income.score + tax_compliance.score + recent_activity.score) / 3.0),
        income,
        tax_compliance,
        recent_activity,
    }
}

fn income_floor(data: &ApplicantData, reference_income: f64) -> ThresholdCheck {
    let title = data
        .text("title")
        .or_else(|| data.text("position"))
        .and_then(AcademicTitle::parse);
    let fraction = title.map(AcademicTitle::income_fraction).unwrap_or(0.7);
    let floor = reference_income * fraction;

    let Some(income) = data
        .number("annual_income")
        .or_else(|| data.number("salary"))
    else {
        return ThresholdCheck {
            passed: false,
            score: 0.0,
            details: format!("annual income not provided (floor {floor:.0})"),
        };
    };

    if floor <= 0.0 || income >= floor {
        ThresholdCheck {
            passed: true,
            score: 100.0,
            details: format!("income {income:.0} meets the floor of {floor:.0}"),
        }
    } else {
        ThresholdCheck {
            passed: false,
            score: round2((income / floor * 100.0).clamp(0.0, 100.0)),
            details: format!("income {income:.0} is below the floor of {floor:.0}"),
        }
    }
}

fn tax_compliance(data: &ApplicantData) -> ThresholdCheck {
    let late = data
        .number_at(&["tax", "late_payments"])
        .or_else(|| data.number("late_tax_payments"))
        .unwrap_or(0.0)
        .max(0.0);
    let delinquent = data.flag_at(&["tax", "delinquent"]) || data.flag("tax_delinquent");

    let mut score = 100.0 - late * LATE_PAYMENT_PENALTY;
    if delinquent {
        score -= DELINQUENCY_PENALTY;
    }
    let score = score.clamp(0.0, 100.0);

    ThresholdCheck {
        passed: score >= TAX_PASS,
        score,
        details: if delinquent {
            format!("{late} late payments with outstanding delinquency")
        } else {
            format!("{late} late payments")
        },
    }
}

fn recent_activity(data: &ApplicantData) -> ThresholdCheck {
    let courses = data.number("courses_last_year").unwrap_or(0.0);
    let publications = data.number("publications_last_year").unwrap_or(0.0);

    if courses > 0.0 || publications > 0.0 {
        return ThresholdCheck {
            passed: true,
            score: 100.0,
            details: format!("{courses} courses and {publications} publications in the last year"),
        };
    }

    match data.number("months_since_last_activity") {
        Some(months) if months <= RECENT_ACTIVITY_MONTHS => ThresholdCheck {
            passed: false,
            score: PARTIAL_ACTIVITY_CREDIT,
            details: format!("last academic activity {months} months ago"),
        },
        _ => ThresholdCheck {
            passed: false,
            score: 0.0,
            details: "no academic activity within the last year".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> ApplicantData {
        ApplicantData::from_value(value).expect("object")
    }

    #[test]
    fn income_floor_is_indexed_by_position() {
        let report = review(
            &data(json!({ "title": "assistant professor", "annual_income": 30_000_000 })),
            40_000_000.0,
        );
        // floor = 0.8 * 40M = 32M
        assert!(!report.income.passed);
        assert_eq!(report.income.score, 93.75);
    }

    #[test]
    fn delinquency_fails_tax_compliance() {
        let report = review(
            &data(json!({ "tax": { "late_payments": 1, "delinquent": true } })),
            40_000_000.0,
        );
        assert_eq!(report.tax_compliance.score, 50.0);
        assert!(!report.tax_compliance.passed);
    }

    #[test]
    fn older_activity_earns_partial_credit() {
        let report = review(&data(json!({ "months_since_last_activity": 9 })), 1.0);
        assert_eq!(report.recent_activity.score, 60.0);
        assert!(!report.passed);
    }
}
