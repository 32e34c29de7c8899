//! Search request payload.

use crate::analysis::normalizer::fields;
use crate::models::ReportMode;
use crate::query::filters::AwardFilter;
use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 100;

/// Columns requested in search mode.
pub const SEARCH_FIELDS: [&str; 15] = [
    fields::AWARD_ID,
    fields::RECIPIENT_NAME,
    fields::AWARD_AMOUNT,
    fields::TOTAL_OUTLAYS,
    fields::DESCRIPTION,
    fields::CONTRACT_AWARD_TYPE,
    fields::DEF_CODES,
    fields::COVID_OBLIGATIONS,
    fields::COVID_OUTLAYS,
    fields::INFRASTRUCTURE_OBLIGATIONS,
    fields::INFRASTRUCTURE_OUTLAYS,
    fields::AWARDING_AGENCY,
    fields::AWARDING_SUBAGENCY,
    fields::BASE_OBLIGATION_DATE,
    fields::LAST_MODIFIED_DATE,
];

/// Columns requested in analysis mode.
pub const ANALYSIS_FIELDS: [&str; 8] = [
    fields::AWARD_ID,
    fields::RECIPIENT_NAME,
    fields::AWARD_AMOUNT,
    fields::TOTAL_OUTLAYS,
    fields::DESCRIPTION,
    fields::CONTRACT_AWARD_TYPE,
    fields::PERIOD_START,
    fields::PERIOD_END,
];

pub fn fields_for(mode: ReportMode) -> &'static [&'static str] {
    match mode {
        ReportMode::Search => &SEARCH_FIELDS,
        ReportMode::Analysis => &ANALYSIS_FIELDS,
    }
}

/// One page of the award search, largest awards first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub filters: AwardFilter,
    pub fields: Vec<String>,
    pub limit: usize,
    pub page: u32,
    pub sort: String,
    pub order: String,
    pub subawards: bool,
}

impl SearchRequest {
    pub fn new(filters: AwardFilter, mode: ReportMode) -> Self {
        Self {
            filters,
            fields: fields_for(mode).iter().map(|f| f.to_string()).collect(),
            limit: DEFAULT_LIMIT,
            page: 1,
            sort: fields::AWARD_AMOUNT.to_string(),
            order: "desc".to_string(),
            subawards: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn agency_name(&self) -> &str {
        self.filters.agency_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filters::FilterInput;

    #[test]
    fn test_field_sets_per_mode() {
        assert_eq!(fields_for(ReportMode::Search).len(), 15);
        assert_eq!(fields_for(ReportMode::Analysis).len(), 8);
        assert!(fields_for(ReportMode::Analysis).contains(&"Period of Performance Start Date"));
        assert!(!fields_for(ReportMode::Analysis).contains(&"def_codes"));
    }

    #[test]
    fn test_payload_shape() {
        let filters = FilterInput::default().build(ReportMode::Analysis).unwrap();
        let request = SearchRequest::new(filters, ReportMode::Analysis).with_limit(25);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["limit"], 25);
        assert_eq!(json["page"], 1);
        assert_eq!(json["sort"], "Award Amount");
        assert_eq!(json["order"], "desc");
        assert_eq!(json["subawards"], false);
        assert_eq!(json["fields"].as_array().unwrap().len(), 8);
        assert_eq!(json["filters"]["award_type_codes"][0], "A");
        assert_eq!(json["filters"]["recipient_locations"][0]["country"], "USA");
    }
}
