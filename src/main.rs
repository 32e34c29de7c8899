//! AwardLens - federal contract-award reports from the terminal
//!
//! Searches the USAspending.gov award endpoint, turns one page of results
//! into a table, statistics, a narrative and a chart, and then answers
//! questions about the narrative through a text-generation service.
//!
//! Exit codes:
//!   0 - Success (including a search that matched nothing)
//!   1 - Runtime error (invalid filters, remote failure, report or file error, etc.)

mod analysis;
mod assistant;
mod cli;
mod config;
mod error;
mod models;
mod query;
mod report;

use anyhow::{Context, Result};
use assistant::QuerySession;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use error::FetchError;
use indicatif::{ProgressBar, ProgressStyle};
use query::{prompt_filters, QueryClient, SearchRequest};
use report::{ChartRenderer, SvgChartRenderer};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: invalid arguments: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("AwardLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .awardlens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "Error: config exists: {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the endpoint, provider, model and chart settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete search, report and question workflow. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // A missing .env file is fine; the credential may come from the environment.
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    let mode = config.general.mode;
    info!("Report mode: {}", mode);

    // Step 1: Collect filters
    let preset = args.filter_input();
    let answers = if args.no_prompt {
        preset
    } else {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        prompt_filters(&mut input, &mut output, mode, preset)
            .context("Failed to read filter answers")?
    };
    let filters = answers.build(mode)?;
    let request = SearchRequest::new(filters, mode).with_limit(config.query.limit);

    // Handle --dry-run: show the payload and exit
    if args.dry_run {
        return handle_dry_run(&request, &config);
    }

    // Step 2: Fetch awards
    let agency = request.agency_name().to_string();
    println!("\nFetching awards for {}...", agency);

    let client = QueryClient::new(config.query_client_config())?;
    let spinner = (!args.quiet).then(|| fetch_spinner(&agency));
    let fetched = client.fetch_awards(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let raw = match fetched {
        Ok(raw) => raw,
        Err(FetchError::EmptyResult { agency }) => {
            println!("\nNo results found for {}", agency);
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    // Step 3: Build the report
    let records = analysis::normalize_all(&raw);
    let report = report::build_report(&records, mode, &agency, config.report_options())?;

    println!(
        "{}",
        report::render_award_table(&format!("Contract Awards for {}", agency), &report.table)
    );
    println!("Found {} contract awards for {}", records.len(), agency);
    println!("{}", report::render_statistics(&report.statistics));

    // Step 4: Save the report and the chart
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };
    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    let chart_path = Path::new(&config.report.chart_path);
    SvgChartRenderer.render(&report.chart, chart_path)?;

    println!("\nSummary:\n{}", report.narrative);
    println!(
        "\nReport saved to: {}\nChart saved to: {}",
        output_path.display(),
        chart_path.display()
    );
    println!("Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    // Step 5: Questions
    if args.no_chat {
        return Ok(0);
    }
    run_session(&config, report.narrative).await?;

    Ok(0)
}

/// Start the question loop. A service that cannot be reached is reported,
/// not fatal: the report has already been written.
async fn run_session(config: &Config, narrative: String) -> Result<()> {
    let generator = match assistant::connect(
        config.assistant.provider,
        config.generation_settings(),
        &config.assistant.api_key_env,
    ) {
        Ok(generator) => generator,
        Err(e) => {
            warn!("Question session unavailable: {}", e);
            eprintln!("\nError: generation service error: {}", e);
            return Ok(());
        }
    };

    let session = QuerySession::new(
        generator.as_ref(),
        narrative,
        Duration::from_secs(config.assistant.timeout_seconds),
    );

    let mut output = io::stdout();
    if config.assistant.briefing {
        session.brief(&mut output).await?;
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let asked = session.run(&mut input, &mut output).await?;
    output.flush()?;

    info!("Question session ended after {} questions", asked);
    Ok(())
}

fn fetch_spinner(agency: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching data for {}...", agency));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Handle --dry-run: print the request that would be sent, exit.
fn handle_dry_run(request: &SearchRequest, config: &Config) -> Result<i32> {
    println!("\nDry run: no request will be sent.\n");
    println!("POST {}", config.query.endpoint);
    println!(
        "{}",
        serde_json::to_string_pretty(request).context("Failed to serialize search request")?
    );
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
