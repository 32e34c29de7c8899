//! Report composition and Markdown/JSON generation.
//!
//! A report is built in one pass from one record set: the statistics,
//! the narrative, the table view and the chart payload all come from the
//! same records, so they can never disagree.

use crate::analysis::{aggregate, award_histogram, top_recipients, HistogramBucket};
use crate::error::ReportError;
use crate::models::{AwardRecord, RecipientTotal, ReportMode, Statistics};
use crate::report::format::{format_currency, format_date, format_percentage, truncate};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ranking sizes and histogram resolution.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub histogram_bins: usize,
    pub chart_top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            chart_top_n: 10,
        }
    }
}

/// Header row plus one formatted row per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One slice of the contract-type distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTypeShare {
    pub contract_type: String,
    pub count: usize,
    pub proportion: f64,
}

/// Data series handed to the chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub title: String,
    pub contract_types: Vec<ContractTypeShare>,
    pub histogram: Vec<HistogramBucket>,
    /// Largest recipients, labels already truncated for display.
    pub top_recipients: Vec<RecipientTotal>,
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub agency: String,
    pub mode: ReportMode,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
}

/// The complete award report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardReport {
    pub metadata: ReportMetadata,
    pub statistics: Statistics,
    pub narrative: String,
    pub table: TableView,
    pub chart: ChartPayload,
}

/// Build every view of the report from `records`.
///
/// Aggregation and date formatting failures are returned as-is; no
/// partial report is produced.
pub fn build_report(
    records: &[AwardRecord],
    mode: ReportMode,
    agency: &str,
    options: ReportOptions,
) -> Result<AwardReport, ReportError> {
    let statistics = aggregate(records)?;
    let narrative = compose_narrative(&statistics);
    let table = build_table(records, mode)?;
    let chart = build_chart_payload(records, &statistics, agency, options);

    Ok(AwardReport {
        metadata: ReportMetadata {
            agency: agency.to_string(),
            mode,
            generated_at: Utc::now(),
            record_count: records.len(),
        },
        statistics,
        narrative,
        table,
        chart,
    })
}

/// Fixed-template paragraph summarizing the statistics.
pub fn compose_narrative(stats: &Statistics) -> String {
    let dominant = stats.dominant_contract_type().unwrap_or("Unknown");
    let (top_name, top_total) = stats
        .top_recipients
        .first()
        .map(|r| (r.name.as_str(), r.total))
        .unwrap_or(("Unknown", 0.0));

    format!(
        "The analysis found {} contracts awarded. \
         The total value of these contracts is {}, with an average award of {} \
         and a median award of {}. \
         The largest contract awarded was for {}, while the smallest was for {}. \
         The most common contract type was {}. \
         The top recipient was {} with a total award value of {}.",
        stats.total_awards,
        format_currency(stats.total_value),
        format_currency(stats.average_award),
        format_currency(stats.median_award),
        format_currency(stats.max_award),
        format_currency(stats.min_award),
        dominant,
        top_name,
        format_currency(top_total),
    )
}

/// Table columns for the given mode.
pub fn table_headers(mode: ReportMode) -> Vec<String> {
    let headers: &[&str] = match mode {
        ReportMode::Search => &[
            "Award ID",
            "Recipient Name",
            "Award Amount",
            "Total Outlays",
            "Description",
            "Contract Award Type",
            "def_codes",
            "COVID-19 Obligations",
            "COVID-19 Outlays",
            "Infrastructure Obligations",
            "Infrastructure Outlays",
            "Awarding Agency",
            "Awarding Subagency",
            "Base Obligation Date",
            "Last Modified Date",
        ],
        ReportMode::Analysis => &[
            "Award ID",
            "Recipient",
            "Amount",
            "Description",
            "Type",
            "Duration",
        ],
    };
    headers.iter().map(|h| h.to_string()).collect()
}

/// One formatted row per record.
pub fn build_table(records: &[AwardRecord], mode: ReportMode) -> Result<TableView, ReportError> {
    let rows = records
        .iter()
        .map(|record| match mode {
            ReportMode::Search => search_row(record),
            ReportMode::Analysis => analysis_row(record),
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    Ok(TableView {
        headers: table_headers(mode),
        rows,
    })
}

fn search_row(record: &AwardRecord) -> Result<Vec<String>, ReportError> {
    let def_codes = if record.def_codes.is_empty() {
        "N/A".to_string()
    } else {
        record.def_codes.join(", ")
    };

    Ok(vec![
        record.id.clone(),
        record.recipient_name.clone(),
        format_currency(record.award_amount),
        format_currency(record.total_outlays),
        record.description.clone(),
        record.contract_award_type.clone(),
        def_codes,
        format_currency(record.covid_obligations),
        format_currency(record.covid_outlays),
        format_currency(record.infrastructure_obligations),
        format_currency(record.infrastructure_outlays),
        record.awarding_agency.clone(),
        record.awarding_subagency.clone(),
        format_date(record.base_obligation_date.as_deref())?,
        format_date(record.last_modified_date.as_deref())?,
    ])
}

fn analysis_row(record: &AwardRecord) -> Result<Vec<String>, ReportError> {
    let start = format_date(record.performance_period.start.as_deref())?;
    let end = format_date(record.performance_period.end.as_deref())?;

    Ok(vec![
        record.id.clone(),
        truncate(&record.recipient_name, 30),
        format_currency(record.award_amount),
        truncate(&record.description, 50),
        truncate(&record.contract_award_type, 20),
        format!("{} to {}", start, end),
    ])
}

/// Contract-type proportions, amount histogram and the wider recipient ranking.
pub fn build_chart_payload(
    records: &[AwardRecord],
    stats: &Statistics,
    agency: &str,
    options: ReportOptions,
) -> ChartPayload {
    let contract_types = stats
        .contract_type_shares()
        .into_iter()
        .map(|(contract_type, count, proportion)| ContractTypeShare {
            contract_type,
            count,
            proportion,
        })
        .collect();

    let top_recipients = top_recipients(records, options.chart_top_n)
        .into_iter()
        .map(|r| RecipientTotal {
            name: truncate(&r.name, 30),
            total: r.total,
        })
        .collect();

    ChartPayload {
        title: format!("Award Analysis for {}", agency),
        contract_types,
        histogram: award_histogram(records, options.histogram_bins),
        top_recipients,
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AwardReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Contract Awards for {}\n\n",
        report.metadata.agency
    ));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.narrative));
    output.push_str(&generate_statistics_section(&report.statistics));
    output.push_str(&generate_awards_section(&report.table));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Awarding Agency:** {}\n", metadata.agency));
    section.push_str(&format!("- **Report Mode:** {}\n", metadata.mode));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Awards Retrieved:** {}\n",
        metadata.record_count
    ));
    section.push('\n');

    section
}

fn generate_summary_section(narrative: &str) -> String {
    format!("## Summary\n\n{}\n\n", narrative)
}

fn generate_statistics_section(stats: &Statistics) -> String {
    let mut section = String::new();

    section.push_str("## Financial Statistics\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|---:|\n");
    for (metric, value) in statistics_rows(stats) {
        section.push_str(&format!("| {} | {} |\n", metric, value));
    }
    section.push('\n');

    section.push_str("### Contract Types\n\n");
    section.push_str("| Contract Type | Count | Percentage |\n");
    section.push_str("|:---|:---:|---:|\n");
    for (name, count, share) in stats.contract_type_shares() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&name),
            count,
            format_percentage(share)
        ));
    }
    section.push('\n');

    section.push_str("### Top Recipients\n\n");
    section.push_str("| Recipient | Total Awards |\n");
    section.push_str("|:---|---:|\n");
    for recipient in &stats.top_recipients {
        section.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&truncate(&recipient.name, 40)),
            format_currency(recipient.total)
        ));
    }
    section.push('\n');

    section
}

/// Metric/value pairs of the financial statistics panel.
pub fn statistics_rows(stats: &Statistics) -> Vec<(&'static str, String)> {
    vec![
        ("Total Number of Awards", stats.total_awards.to_string()),
        ("Total Value", format_currency(stats.total_value)),
        ("Average Award", format_currency(stats.average_award)),
        ("Median Award", format_currency(stats.median_award)),
        ("Largest Award", format_currency(stats.max_award)),
        ("Smallest Award", format_currency(stats.min_award)),
        ("Standard Deviation", format_currency(stats.std_dev)),
    ]
}

fn generate_awards_section(table: &TableView) -> String {
    let mut section = String::new();

    section.push_str("## Awards\n\n");
    section.push_str(&format!("| {} |\n", table.headers.join(" | ")));
    section.push_str(&format!(
        "|{}\n",
        table.headers.iter().map(|_| ":---|").collect::<String>()
    ));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    section.push('\n');

    section
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn generate_footer() -> String {
    "---\n\n*Data source: USAspending.gov award search. Report generated by AwardLens.*\n"
        .to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AwardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
