//! Award search filters.
//!
//! User answers are collected into a [`FilterInput`] (from flags or
//! interactive prompts) and turned into a validated [`AwardFilter`] with
//! the defaults of the selected report mode.

use crate::error::FilterError;
use crate::models::ReportMode;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

pub const DEFAULT_AWARD_TYPES: [&str; 4] = ["A", "B", "C", "D"];

/// Mode-specific defaults applied to blank answers.
#[derive(Debug, Clone, Copy)]
pub struct ModeDefaults {
    pub agency: &'static str,
    pub period: Option<(&'static str, &'static str)>,
    pub recipient: Option<&'static str>,
    pub location: Option<(&'static str, &'static str)>,
}

impl ModeDefaults {
    pub fn for_mode(mode: ReportMode) -> Self {
        match mode {
            ReportMode::Search => Self {
                agency: "Department of Defense",
                period: None,
                recipient: None,
                location: None,
            },
            ReportMode::Analysis => Self {
                agency: "Centers for Medicare and Medicaid Services",
                period: Some(("2007-10-01", "2025-09-30")),
                recipient: Some("VITG Corp"),
                location: Some(("MD", "USA")),
            },
        }
    }
}

/// Raw, unvalidated filter answers. `None` or blank means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    pub agency: Option<String>,
    pub award_types: Option<String>,
    pub fiscal_year: Option<String>,
    pub recipient: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgencyFilter {
    #[serde(rename = "type")]
    pub kind: String,
    pub tier: String,
    pub name: String,
}

impl AgencyFilter {
    /// An awarding sub-tier agency matched by name.
    pub fn awarding(name: &str) -> Self {
        Self {
            kind: "awarding".to_string(),
            tier: "subtier".to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePeriod {
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientLocation {
    pub state: String,
    pub country: String,
}

/// The `filters` object of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardFilter {
    pub agencies: Vec<AgencyFilter>,
    pub award_type_codes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub time_period: Vec<TimePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient_search_text: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient_locations: Vec<RecipientLocation>,
}

impl AwardFilter {
    /// Name of the first awarding agency, used in report titles.
    pub fn agency_name(&self) -> &str {
        self.agencies.first().map(|a| a.name.as_str()).unwrap_or("")
    }
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_fiscal_year(raw: &str) -> Result<TimePeriod, FilterError> {
    let invalid = || FilterError::InvalidFiscalYear(raw.to_string());

    if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = raw.parse().map_err(|_| invalid())?;

    Ok(TimePeriod {
        start_date: NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?,
        end_date: NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?,
    })
}

fn parse_award_types(raw: &str) -> Result<Vec<String>, FilterError> {
    let codes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    if codes.is_empty() {
        Err(FilterError::EmptyAwardTypes)
    } else {
        Ok(codes)
    }
}

fn default_period(period: (&str, &str)) -> Vec<TimePeriod> {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(period.0), parse(period.1)) {
        (Some(start_date), Some(end_date)) => vec![TimePeriod {
            start_date,
            end_date,
        }],
        _ => Vec::new(),
    }
}

impl FilterInput {
    /// Validate the answers and fill in the defaults of `mode`.
    pub fn build(&self, mode: ReportMode) -> Result<AwardFilter, FilterError> {
        let defaults = ModeDefaults::for_mode(mode);

        let agency = non_blank(&self.agency).unwrap_or(defaults.agency);

        let award_type_codes = match non_blank(&self.award_types) {
            Some(raw) => parse_award_types(raw)?,
            None => DEFAULT_AWARD_TYPES.iter().map(|c| c.to_string()).collect(),
        };

        let time_period = match non_blank(&self.fiscal_year) {
            Some(year) => vec![parse_fiscal_year(year)?],
            None => defaults.period.map(default_period).unwrap_or_default(),
        };

        let recipient_search_text = non_blank(&self.recipient)
            .or(defaults.recipient)
            .map(|r| vec![r.to_string()])
            .unwrap_or_default();

        let state = non_blank(&self.state);
        let country = non_blank(&self.country);
        let location = match (state, country) {
            (Some(state), Some(country)) => Some((state, country)),
            (None, None) => defaults.location,
            _ => {
                warn!("Recipient location needs both a state and a country; using the default");
                defaults.location
            }
        };
        let recipient_locations = location
            .map(|(state, country)| {
                vec![RecipientLocation {
                    state: state.to_string(),
                    country: country.to_string(),
                }]
            })
            .unwrap_or_default();

        let filter = AwardFilter {
            agencies: vec![AgencyFilter::awarding(agency)],
            award_type_codes,
            time_period,
            recipient_search_text,
            recipient_locations,
        };
        debug!("Built filter: {:?}", filter);
        Ok(filter)
    }
}

/// Ask for every answer not already present in `preset`.
///
/// End of input counts as a blank answer.
pub fn prompt_filters<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    mode: ReportMode,
    preset: FilterInput,
) -> io::Result<FilterInput> {
    let defaults = ModeDefaults::for_mode(mode);
    let mut answers = preset;

    writeln!(output, "Welcome to the Award Search Tool!")?;

    if answers.agency.is_none() {
        answers.agency = ask(
            input,
            output,
            &format!(
                "Enter the Awarding Agency Name (default: {}): ",
                defaults.agency
            ),
        )?;
    }

    if answers.award_types.is_none() {
        answers.award_types = ask(
            input,
            output,
            &format!(
                "Enter Award Type Codes (comma-separated, default: {}): ",
                DEFAULT_AWARD_TYPES.join(",")
            ),
        )?;
    }

    if answers.fiscal_year.is_none() {
        let hint = match defaults.period {
            Some((start, end)) => format!("default: {} to {}", start, end),
            None => "leave blank to skip".to_string(),
        };
        answers.fiscal_year = ask(
            input,
            output,
            &format!("Enter Fiscal Year (e.g., 2023; {}): ", hint),
        )?;
    }

    if answers.recipient.is_none() {
        let hint = defaults
            .recipient
            .map(|r| format!("default: {}", r))
            .unwrap_or_else(|| "leave blank to skip".to_string());
        answers.recipient = ask(input, output, &format!("Enter Recipient Name ({}): ", hint))?;
    }

    if answers.state.is_none() && answers.country.is_none() {
        let hint = defaults
            .location
            .map(|(state, country)| format!("default: {} / {}", state, country))
            .unwrap_or_else(|| "leave blank to skip".to_string());
        answers.state = ask(
            input,
            output,
            &format!("Enter Recipient State ({}): ", hint),
        )?;
        answers.country = ask(input, output, "Enter Recipient Country: ")?;
    }

    Ok(answers)
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_search_defaults() {
        let filter = FilterInput::default().build(ReportMode::Search).unwrap();

        assert_eq!(filter.agency_name(), "Department of Defense");
        assert_eq!(filter.award_type_codes, vec!["A", "B", "C", "D"]);
        assert!(filter.time_period.is_empty());
        assert!(filter.recipient_search_text.is_empty());
        assert!(filter.recipient_locations.is_empty());
    }

    #[test]
    fn test_analysis_defaults() {
        let filter = FilterInput::default().build(ReportMode::Analysis).unwrap();

        assert_eq!(
            filter.agency_name(),
            "Centers for Medicare and Medicaid Services"
        );
        assert_eq!(filter.recipient_search_text, vec!["VITG Corp"]);
        assert_eq!(
            filter.recipient_locations,
            vec![RecipientLocation {
                state: "MD".to_string(),
                country: "USA".to_string()
            }]
        );
        assert_eq!(
            filter.time_period[0].start_date,
            NaiveDate::from_ymd_opt(2007, 10, 1).unwrap()
        );
    }

    #[test]
    fn test_fiscal_year_maps_to_calendar_year() {
        let input = FilterInput {
            fiscal_year: Some("2023".to_string()),
            ..FilterInput::default()
        };
        let filter = input.build(ReportMode::Analysis).unwrap();

        assert_eq!(filter.time_period.len(), 1);
        assert_eq!(
            filter.time_period[0].start_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
        assert_eq!(
            filter.time_period[0].end_date,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_invalid_fiscal_year() {
        for bad in ["23", "20x3", "twenty"] {
            let input = FilterInput {
                fiscal_year: Some(bad.to_string()),
                ..FilterInput::default()
            };
            assert_eq!(
                input.build(ReportMode::Search),
                Err(FilterError::InvalidFiscalYear(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_award_types_parsing() {
        let input = FilterInput {
            award_types: Some(" A , D,".to_string()),
            ..FilterInput::default()
        };
        assert_eq!(
            input.build(ReportMode::Search).unwrap().award_type_codes,
            vec!["A", "D"]
        );

        let input = FilterInput {
            award_types: Some(", ,".to_string()),
            ..FilterInput::default()
        };
        assert_eq!(
            input.build(ReportMode::Search),
            Err(FilterError::EmptyAwardTypes)
        );
    }

    #[test]
    fn test_partial_location_falls_back_to_default() {
        let input = FilterInput {
            state: Some("VA".to_string()),
            ..FilterInput::default()
        };
        let filter = input.build(ReportMode::Analysis).unwrap();
        assert_eq!(filter.recipient_locations[0].state, "MD");

        let filter = input.build(ReportMode::Search).unwrap();
        assert!(filter.recipient_locations.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let input = FilterInput {
            agency: Some("NASA".to_string()),
            fiscal_year: Some("2021".to_string()),
            ..FilterInput::default()
        };
        let json = serde_json::to_value(input.build(ReportMode::Search).unwrap()).unwrap();

        assert_eq!(json["agencies"][0]["type"], "awarding");
        assert_eq!(json["agencies"][0]["tier"], "subtier");
        assert_eq!(json["agencies"][0]["name"], "NASA");
        assert_eq!(json["time_period"][0]["start_date"], "2021-01-01");
        assert_eq!(json["time_period"][0]["end_date"], "2021-12-31");
        assert!(json.get("recipient_search_text").is_none());
        assert!(json.get("recipient_locations").is_none());
    }

    #[test]
    fn test_prompt_blank_answers_select_defaults() {
        let mut input = Cursor::new("\n\n\n\n\n\n");
        let mut output = Vec::new();

        let answers = prompt_filters(
            &mut input,
            &mut output,
            ReportMode::Search,
            FilterInput::default(),
        )
        .unwrap();
        assert_eq!(answers, FilterInput::default());

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("default: Department of Defense"));
    }

    #[test]
    fn test_prompt_collects_answers_and_skips_presets() {
        let mut input = Cursor::new("B,C\n2022\nACME\nTX\nUSA\n");
        let mut output = Vec::new();
        let preset = FilterInput {
            agency: Some("Department of Energy".to_string()),
            ..FilterInput::default()
        };

        let answers =
            prompt_filters(&mut input, &mut output, ReportMode::Analysis, preset).unwrap();
        assert_eq!(answers.agency.as_deref(), Some("Department of Energy"));
        assert_eq!(answers.award_types.as_deref(), Some("B,C"));
        assert_eq!(answers.fiscal_year.as_deref(), Some("2022"));
        assert_eq!(answers.recipient.as_deref(), Some("ACME"));
        assert_eq!(answers.state.as_deref(), Some("TX"));
        assert_eq!(answers.country.as_deref(), Some("USA"));

        let transcript = String::from_utf8(output).unwrap();
        assert!(!transcript.contains("Awarding Agency Name"));
    }

    #[test]
    fn test_prompt_end_of_input_is_blank() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let answers = prompt_filters(
            &mut input,
            &mut output,
            ReportMode::Analysis,
            FilterInput::default(),
        )
        .unwrap();
        assert_eq!(answers, FilterInput::default());
    }
}
