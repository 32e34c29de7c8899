//! Report generation module.
//!
//! Display formatting, report composition, terminal panels and the chart file.

pub mod chart;
pub mod format;
pub mod generator;
pub mod terminal;

pub use chart::{ChartRenderer, SvgChartRenderer};
pub use generator::{build_report, generate_json_report, generate_markdown_report, ReportOptions};
pub use terminal::{render_award_table, render_statistics};
