//! Raw search result to `AwardRecord` conversion.
//!
//! This is the only place where missing or mistyped source fields are
//! replaced with defaults. Everything downstream assumes complete records.

use crate::models::{AwardRecord, PerformancePeriod};
use serde_json::{Map, Value};
use tracing::debug;

/// Source field names as returned by the award search endpoint.
pub mod fields {
    pub const AWARD_ID: &str = "Award ID";
    pub const RECIPIENT_NAME: &str = "Recipient Name";
    pub const AWARD_AMOUNT: &str = "Award Amount";
    pub const TOTAL_OUTLAYS: &str = "Total Outlays";
    pub const DESCRIPTION: &str = "Description";
    pub const CONTRACT_AWARD_TYPE: &str = "Contract Award Type";
    pub const DEF_CODES: &str = "def_codes";
    pub const COVID_OBLIGATIONS: &str = "COVID-19 Obligations";
    pub const COVID_OUTLAYS: &str = "COVID-19 Outlays";
    pub const INFRASTRUCTURE_OBLIGATIONS: &str = "Infrastructure Obligations";
    pub const INFRASTRUCTURE_OUTLAYS: &str = "Infrastructure Outlays";
    pub const AWARDING_AGENCY: &str = "Awarding Agency";
    pub const AWARDING_SUBAGENCY: &str = "Awarding Subagency";
    pub const BASE_OBLIGATION_DATE: &str = "Base Obligation Date";
    pub const LAST_MODIFIED_DATE: &str = "Last Modified Date";
    pub const PERIOD_START: &str = "Period of Performance Start Date";
    pub const PERIOD_END: &str = "Period of Performance Current End Date";
}

/// Convert one raw result into a fully populated record. Never fails.
///
/// A value that is not a JSON object yields a record made entirely of defaults.
pub fn normalize(raw: &Value) -> AwardRecord {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let defaults = AwardRecord::default();

    AwardRecord {
        id: text_or(obj, fields::AWARD_ID, &defaults.id),
        recipient_name: text_or(obj, fields::RECIPIENT_NAME, &defaults.recipient_name),
        award_amount: amount(obj, fields::AWARD_AMOUNT),
        total_outlays: amount(obj, fields::TOTAL_OUTLAYS),
        description: text_or(obj, fields::DESCRIPTION, &defaults.description),
        contract_award_type: text_or(
            obj,
            fields::CONTRACT_AWARD_TYPE,
            &defaults.contract_award_type,
        ),
        def_codes: codes(obj, fields::DEF_CODES),
        performance_period: PerformancePeriod {
            start: optional_text(obj, fields::PERIOD_START),
            end: optional_text(obj, fields::PERIOD_END),
        },
        covid_obligations: amount(obj, fields::COVID_OBLIGATIONS),
        covid_outlays: amount(obj, fields::COVID_OUTLAYS),
        infrastructure_obligations: amount(obj, fields::INFRASTRUCTURE_OBLIGATIONS),
        infrastructure_outlays: amount(obj, fields::INFRASTRUCTURE_OUTLAYS),
        awarding_agency: text_or(obj, fields::AWARDING_AGENCY, &defaults.awarding_agency),
        awarding_subagency: text_or(
            obj,
            fields::AWARDING_SUBAGENCY,
            &defaults.awarding_subagency,
        ),
        base_obligation_date: optional_text(obj, fields::BASE_OBLIGATION_DATE),
        last_modified_date: optional_text(obj, fields::LAST_MODIFIED_DATE),
    }
}

/// Normalize a whole result page.
pub fn normalize_all(raw: &[Value]) -> Vec<AwardRecord> {
    raw.iter().map(normalize).collect()
}

/// Text value of a field; numbers are rendered, anything else is absent.
fn optional_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn text_or(obj: &Map<String, Value>, key: &str, default: &str) -> String {
    optional_text(obj, key).unwrap_or_else(|| default.to_string())
}

/// Numeric value of a field, or 0 when absent, non-numeric or negative.
fn amount(obj: &Map<String, Value>, key: &str) -> f64 {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            debug!("Coercing out-of-range value {} for '{}' to 0", v, key);
            0.0
        }
        None => 0.0,
    }
}

/// `def_codes` arrives as a list of strings, occasionally as one delimited string.
fn codes(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
