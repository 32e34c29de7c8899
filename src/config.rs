//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.awardlens.toml` files.

use crate::assistant::{GenerationSettings, Provider};
use crate::models::ReportMode;
use crate::query::QueryClientConfig;
use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = ".awardlens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Award search endpoint settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Text-generation settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Report mode used when `--mode` is not given.
    #[serde(default)]
    pub mode: ReportMode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            mode: ReportMode::default(),
        }
    }
}

fn default_output() -> String {
    "award_report.md".to_string()
}

/// Award search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Records requested (single page).
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_query_timeout")]
    pub timeout_seconds: u64,

    /// Attempts for retriable failures, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial retry delay, doubled per attempt.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            limit: default_limit(),
            timeout_seconds: default_query_timeout(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_endpoint() -> String {
    QueryClientConfig::default().endpoint
}

fn default_limit() -> usize {
    crate::query::request::DEFAULT_LIMIT
}

fn default_query_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

/// Text-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub provider: Provider,

    /// Model name; the provider's default when unset.
    #[serde(default)]
    pub model: Option<String>,

    /// Service base URL; the provider's default when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-question timeout in seconds.
    #[serde(default = "default_assistant_timeout")]
    pub timeout_seconds: u64,

    /// Send the sentiment and summary prompts before the first question.
    #[serde(default = "default_true")]
    pub briefing: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            base_url: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_seconds: default_assistant_timeout(),
            briefing: true,
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_assistant_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Chart file path, overwritten on every run.
    #[serde(default = "default_chart_path")]
    pub chart_path: String,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Recipients shown in the chart.
    #[serde(default = "default_chart_top_n")]
    pub chart_top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chart_path: default_chart_path(),
            histogram_bins: default_histogram_bins(),
            chart_top_n: default_chart_top_n(),
        }
    }
}

fn default_chart_path() -> String {
    "award_analysis.svg".to_string()
}

fn default_histogram_bins() -> usize {
    20
}

fn default_chart_top_n() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(mode) = args.mode {
            self.general.mode = mode;
        }
        match args.output {
            Some(ref output) => self.general.output = output.display().to_string(),
            None => {
                self.general.output = Path::new(&self.general.output)
                    .with_extension(args.format.extension())
                    .display()
                    .to_string();
            }
        }
        if let Some(ref chart) = args.chart {
            self.report.chart_path = chart.display().to_string();
        }

        // A provider switch invalidates the other provider's model and URL.
        if let Some(provider) = args.provider {
            if provider != self.assistant.provider {
                self.assistant.model = None;
                self.assistant.base_url = None;
            }
            self.assistant.provider = provider;
        }
        if let Some(ref model) = args.model {
            self.assistant.model = Some(model.clone());
        }
        if let Some(timeout) = args.timeout {
            self.assistant.timeout_seconds = timeout;
        }
    }

    pub fn query_client_config(&self) -> QueryClientConfig {
        QueryClientConfig {
            endpoint: self.query.endpoint.clone(),
            timeout_seconds: self.query.timeout_seconds,
            max_attempts: self.query.max_attempts,
            backoff_ms: self.query.backoff_ms,
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        let mut settings = GenerationSettings::for_provider(self.assistant.provider);
        if let Some(ref model) = self.assistant.model {
            settings.model = model.clone();
        }
        if let Some(ref base_url) = self.assistant.base_url {
            settings.base_url = base_url.clone();
        }
        settings.temperature = self.assistant.temperature;
        settings.timeout_seconds = self.assistant.timeout_seconds;
        settings
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            histogram_bins: self.report.histogram_bins,
            chart_top_n: self.report.chart_top_n,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "award_report.md");
        assert_eq!(config.general.mode, ReportMode::Analysis);
        assert_eq!(config.query.limit, 100);
        assert_eq!(config.query.max_attempts, 3);
        assert_eq!(config.assistant.provider, Provider::Gemini);
        assert_eq!(config.assistant.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.report.chart_path, "award_analysis.svg");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
mode = "search"

[query]
limit = 25
backoff_ms = 100

[assistant]
provider = "ollama"
model = "mistral:7b"
briefing = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert_eq!(config.general.mode, ReportMode::Search);
        assert_eq!(config.query.limit, 25);
        assert_eq!(config.query.timeout_seconds, 30);
        assert_eq!(config.assistant.provider, Provider::Ollama);
        assert!(!config.assistant.briefing);

        let settings = config.generation_settings();
        assert_eq!(settings.model, "mistral:7b");
        assert_eq!(settings.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nhistogram_bins = 10\nchart_top_n = 3").unwrap();

        let config = Config::load(file.path()).unwrap();
        let options = config.report_options();
        assert_eq!(options.histogram_bins, 10);
        assert_eq!(options.chart_top_n, 3);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query\nlimit = ").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.assistant.model = Some("gemini-1.5-pro".to_string());

        let args = Args::try_parse_from([
            "awardlens",
            "--mode",
            "search",
            "--provider",
            "ollama",
            "--timeout",
            "15",
            "--output",
            "out.json",
        ])
        .unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.general.mode, ReportMode::Search);
        assert_eq!(config.general.output, "out.json");
        assert_eq!(config.assistant.provider, Provider::Ollama);
        assert_eq!(config.assistant.model, None);
        assert_eq!(config.assistant.timeout_seconds, 15);
        assert_eq!(config.generation_settings().model, "llama3.2:latest");
    }

    #[test]
    fn test_merge_keeps_file_values_without_flags() {
        let mut config = Config::default();
        config.general.mode = ReportMode::Search;
        config.report.chart_path = "charts/out.svg".to_string();

        let args = Args::try_parse_from(["awardlens"]).unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.general.mode, ReportMode::Search);
        assert_eq!(config.report.chart_path, "charts/out.svg");
    }

    #[test]
    fn test_default_output_follows_format() {
        let mut config = Config::default();
        let args = Args::try_parse_from(["awardlens", "--format", "json"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "award_report.json");

        let mut config = Config::default();
        let args = Args::try_parse_from(["awardlens"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "award_report.md");
    }

    #[test]
    fn test_explicit_output_keeps_its_extension() {
        let mut config = Config::default();
        let args = Args::try_parse_from([
            "awardlens",
            "--format",
            "json",
            "--output",
            "report.txt",
        ])
        .unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "report.txt");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[query]"));
        assert!(toml_str.contains("[assistant]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.query.endpoint, Config::default().query.endpoint);
    }
}
