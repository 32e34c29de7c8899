//! Data models for award analysis.
//!
//! This module contains the canonical award record produced by the
//! normalizer and the statistics derived from a set of records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which field set is requested and which table layout is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Full award listing with obligations, outlays and agencies
    Search,
    /// Compact listing with performance periods, statistics and chat
    #[default]
    Analysis,
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Search => write!(f, "search"),
            ReportMode::Analysis => write!(f, "analysis"),
        }
    }
}

/// Start and end of an award's period of performance (raw `YYYY-MM-DD` text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformancePeriod {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// One contract award after normalization.
///
/// Every field is populated; numeric fields are finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub id: String,
    pub recipient_name: String,
    pub award_amount: f64,
    pub total_outlays: f64,
    pub description: String,
    pub contract_award_type: String,
    pub def_codes: Vec<String>,
    pub performance_period: PerformancePeriod,
    pub covid_obligations: f64,
    pub covid_outlays: f64,
    pub infrastructure_obligations: f64,
    pub infrastructure_outlays: f64,
    pub awarding_agency: String,
    pub awarding_subagency: String,
    pub base_obligation_date: Option<String>,
    pub last_modified_date: Option<String>,
}

impl Default for AwardRecord {
    fn default() -> Self {
        Self {
            id: "N/A".to_string(),
            recipient_name: "Unknown".to_string(),
            award_amount: 0.0,
            total_outlays: 0.0,
            description: "N/A".to_string(),
            contract_award_type: "Unknown".to_string(),
            def_codes: Vec::new(),
            performance_period: PerformancePeriod::default(),
            covid_obligations: 0.0,
            covid_outlays: 0.0,
            infrastructure_obligations: 0.0,
            infrastructure_outlays: 0.0,
            awarding_agency: "N/A".to_string(),
            awarding_subagency: "N/A".to_string(),
            base_obligation_date: None,
            last_modified_date: None,
        }
    }
}

/// A recipient and the sum of its award amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientTotal {
    pub name: String,
    pub total: f64,
}

/// Summary of a record set. Recomputed from scratch for every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_awards: usize,
    pub total_value: f64,
    pub average_award: f64,
    pub median_award: f64,
    pub std_dev: f64,
    pub max_award: f64,
    /// Smallest strictly positive award.
    pub min_award: f64,
    pub contract_type_distribution: BTreeMap<String, usize>,
    /// At most five entries, largest first.
    pub top_recipients: Vec<RecipientTotal>,
}

impl Statistics {
    /// The most frequent contract type; ties go to the smallest name.
    pub fn dominant_contract_type(&self) -> Option<&str> {
        self.contract_type_distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.as_str())
    }

    /// Contract types with their share of all awards, most frequent first.
    pub fn contract_type_shares(&self) -> Vec<(String, usize, f64)> {
        let total: usize = self.contract_type_distribution.values().sum();
        let mut shares: Vec<(String, usize, f64)> = self
            .contract_type_distribution
            .iter()
            .map(|(name, &count)| {
                let share = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                (name.clone(), count, share)
            })
            .collect();

        // BTreeMap order already breaks ties by name; the sort is stable.
        shares.sort_by_key(|(_, count, _)| std::cmp::Reverse(*count));
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(types: &[(&str, usize)]) -> Statistics {
        Statistics {
            total_awards: types.iter().map(|(_, c)| c).sum(),
            total_value: 0.0,
            average_award: 0.0,
            median_award: 0.0,
            std_dev: 0.0,
            max_award: 0.0,
            min_award: 0.0,
            contract_type_distribution: types
                .iter()
                .map(|(name, count)| (name.to_string(), *count))
                .collect(),
            top_recipients: Vec::new(),
        }
    }

    #[test]
    fn test_award_record_defaults() {
        let record = AwardRecord::default();
        assert_eq!(record.recipient_name, "Unknown");
        assert_eq!(record.description, "N/A");
        assert_eq!(record.contract_award_type, "Unknown");
        assert_eq!(record.award_amount, 0.0);
        assert!(record.performance_period.start.is_none());
    }

    #[test]
    fn test_dominant_contract_type() {
        let stats = stats_with(&[("DEFINITIVE CONTRACT", 3), ("PURCHASE ORDER", 5)]);
        assert_eq!(stats.dominant_contract_type(), Some("PURCHASE ORDER"));

        let tied = stats_with(&[("B", 2), ("A", 2)]);
        assert_eq!(tied.dominant_contract_type(), Some("A"));

        assert_eq!(stats_with(&[]).dominant_contract_type(), None);
    }

    #[test]
    fn test_contract_type_shares() {
        let stats = stats_with(&[("A", 1), ("B", 3)]);
        let shares = stats.contract_type_shares();
        assert_eq!(shares[0].0, "B");
        assert_eq!(shares[0].1, 3);
        assert!((shares[0].2 - 0.75).abs() < 1e-12);
        assert!((shares[1].2 - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_report_mode_display() {
        assert_eq!(ReportMode::Search.to_string(), "search");
        assert_eq!(ReportMode::default(), ReportMode::Analysis);
    }
}
