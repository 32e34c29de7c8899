//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::assistant::Provider;
use crate::models::ReportMode;
use crate::query::FilterInput;
use clap::Parser;
use std::path::PathBuf;

/// AwardLens - federal contract-award reports from the terminal
///
/// Searches USAspending.gov for contract awards, prints a ranked table and
/// summary statistics, writes a Markdown/JSON report and an SVG chart, then
/// lets you ask questions about the results.
///
/// Examples:
///   awardlens
///   awardlens --mode search --agency "Department of Energy" --fiscal-year 2023 --no-prompt
///   awardlens --agency "Department of Education" --provider ollama --model llama3.2:latest
///   awardlens --no-prompt --dry-run
///   awardlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Report mode (search, analysis)
    ///
    /// Selects the requested fields, the table layout and the filter defaults.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ReportMode>,

    /// Awarding agency name
    #[arg(long, value_name = "NAME")]
    pub agency: Option<String>,

    /// Award type codes (comma-separated)
    ///
    /// Example: --award-types A,B,C,D
    #[arg(long, value_name = "CODES")]
    pub award_types: Option<String>,

    /// Fiscal year to search (YYYY)
    #[arg(long, value_name = "YEAR")]
    pub fiscal_year: Option<String>,

    /// Recipient name to search for
    #[arg(long, value_name = "NAME")]
    pub recipient: Option<String>,

    /// Recipient state code, used together with --country
    #[arg(long, value_name = "STATE")]
    pub state: Option<String>,

    /// Recipient country code, used together with --state
    #[arg(long, value_name = "COUNTRY")]
    pub country: Option<String>,

    /// Do not prompt for filters; use flags and mode defaults only
    #[arg(long)]
    pub no_prompt: bool,

    /// Skip the interactive question session
    #[arg(long)]
    pub no_chat: bool,

    /// Output file path for the report
    ///
    /// Default: from config or award_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the chart
    ///
    /// Default: from config or award_analysis.svg
    #[arg(long, value_name = "FILE")]
    pub chart: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .awardlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Text-generation provider (gemini, ollama)
    #[arg(long, value_name = "PROVIDER", env = "AWARDLENS_PROVIDER")]
    pub provider: Option<Provider>,

    /// Model used for questions
    #[arg(short, long, value_name = "NAME", env = "AWARDLENS_MODEL")]
    pub model: Option<String>,

    /// Text-generation timeout per question, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the search request payload and exit without any network call
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .awardlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref year) = self.fiscal_year {
            let year = year.trim();
            if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!(
                    "Fiscal year must be a four-digit year, got '{}'",
                    year
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filter answers given as flags; the rest are prompted for or defaulted.
    pub fn filter_input(&self) -> FilterInput {
        FilterInput {
            agency: self.agency.clone(),
            award_types: self.award_types.clone(),
            fiscal_year: self.fiscal_year.clone(),
            recipient: self.recipient.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}
