//! Terminal rendering of the award table and statistics panels.

use crate::models::Statistics;
use crate::report::format::{format_currency, format_percentage, truncate};
use crate::report::generator::{statistics_rows, TableView};
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render a header + rows grid with rounded borders.
fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// The award listing.
pub fn render_award_table(title: &str, view: &TableView) -> String {
    format!("\n{}\n{}\n", title, render_grid(&view.headers, &view.rows))
}

/// Financial statistics, contract types and top recipients, one panel each.
pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();

    out.push_str("\n===== Statistical Analysis =====\n");

    let financial: Vec<Vec<String>> = statistics_rows(stats)
        .into_iter()
        .map(|(metric, value)| vec![metric.to_string(), value])
        .collect();
    out.push_str("\nFinancial Statistics\n");
    out.push_str(&render_grid(
        &["Metric".to_string(), "Value".to_string()],
        &financial,
    ));
    out.push('\n');

    let types: Vec<Vec<String>> = stats
        .contract_type_shares()
        .into_iter()
        .map(|(name, count, share)| vec![name, count.to_string(), format_percentage(share)])
        .collect();
    out.push_str("\nContract Types Distribution\n");
    out.push_str(&render_grid(
        &[
            "Contract Type".to_string(),
            "Count".to_string(),
            "Percentage".to_string(),
        ],
        &types,
    ));
    out.push('\n');

    let recipients: Vec<Vec<String>> = stats
        .top_recipients
        .iter()
        .map(|r| vec![truncate(&r.name, 40), format_currency(r.total)])
        .collect();
    out.push_str(&format!(
        "\nTop {} Recipients\n",
        stats.top_recipients.len()
    ));
    out.push_str(&render_grid(
        &["Recipient".to_string(), "Total Awards".to_string()],
        &recipients,
    ));
    out.push('\n');

    out
}
