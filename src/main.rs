//! Fraudscope - fiscal fraud audit dashboard
//!
//! A CLI client for the fraud-analysis backend: fetches the
//! suspect-property result set and renders the risk distribution,
//! top irregularity reasons, a market scatter projection and a
//! filterable detail table.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection with no prior data, config failure)
//!   2 - Records found at or above --fail-on threshold

mod analysis;
mod cli;
mod client;
mod config;
mod dashboard;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, FailOnLevel, OutputFormat};
use client::AnalysisClient;
use config::Config;
use dashboard::{Dashboard, FetchState};
use indicatif::ProgressBar;
use models::RiskLevel;
use std::io::Write as _;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Fraudscope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard session failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fraudscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".fraudscope.toml");

    if path.exists() {
        eprintln!("⚠️  .fraudscope.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .fraudscope.toml")?;

    println!("✅ Created .fraudscope.toml with default settings.");
    println!("   Edit it to customize the endpoint, timeout and table size.");
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

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the dashboard and run the requested mode. Returns exit code.
async fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = AnalysisClient::new(config.api.endpoint.clone(), config.api.timeout_seconds);
    let mut dashboard = Dashboard::new(client);

    if let Some(ref query) = args.filter {
        dashboard.set_query(query.clone());
    }

    let max_rows = config.display.max_table_rows;

    if args.once {
        run_once(&args, &mut dashboard, max_rows).await
    } else {
        run_interactive(&args, &mut dashboard, max_rows).await
    }
}

/// One fetch, one render, optional report file, then exit.
async fn run_once(args: &Args, dashboard: &mut Dashboard, max_rows: usize) -> Result<i32> {
    refresh_with_spinner(dashboard, args.quiet).await;

    print!("{}", report::render_dashboard(dashboard, max_rows));

    // A failed fetch with nothing to fall back to is a runtime error.
    if dashboard.state() == FetchState::Failed && dashboard.result().is_none() {
        return Ok(1);
    }

    write_report_if_requested(args, dashboard)?;
    Ok(check_fail_on(args, dashboard))
}

/// Interactive session: refresh and filter on user commands.
async fn run_interactive(args: &Args, dashboard: &mut Dashboard, max_rows: usize) -> Result<i32> {
    println!("🔎 Fraudscope — Auditoria Fiscal & Detecção de Fraudes");
    println!("   Endpoint: {}", dashboard.endpoint());
    println!("   Commands: refresh | filter <text> | rules | save [file] | help | quit\n");

    // First fetch on start; same as pressing the refresh control.
    refresh_with_spinner(dashboard, args.quiet).await;
    print!("{}", report::render_dashboard(dashboard, max_rows));

    let stdin = std::io::stdin();
    loop {
        print!("\nfraudscope> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        match parse_command(line.trim()) {
            Command::Refresh => {
                refresh_with_spinner(dashboard, args.quiet).await;
                print!("{}", report::render_dashboard(dashboard, max_rows));
            }
            Command::Filter(query) => {
                dashboard.set_query(query);
                print!("{}", report::render_dashboard(dashboard, max_rows));
            }
            Command::Rules => print_rules(),
            Command::Save(path) => save_report(dashboard, &path),
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Empty => {}
            Command::Unknown(cmd) => {
                println!("Unknown command: '{}'. Try 'help'.", cmd);
            }
        }
    }

    Ok(check_fail_on(args, dashboard))
}

/// User commands of the interactive session.
enum Command {
    Refresh,
    Filter(String),
    Rules,
    Save(String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "" => Command::Empty,
        "r" | "refresh" => Command::Refresh,
        "f" | "filter" => Command::Filter(rest.to_string()),
        "rules" => Command::Rules,
        "save" => Command::Save(if rest.is_empty() {
            "fraudscope_report.md".to_string()
        } else {
            rest.to_string()
        }),
        "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Run a fetch with a spinner while the request is in flight.
async fn refresh_with_spinner(dashboard: &mut Dashboard, quiet: bool) {
    if quiet {
        dashboard.refresh().await;
        return;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Executando auditoria...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    dashboard.refresh().await;

    spinner.finish_and_clear();
}

/// Write the report file when --output was given.
fn write_report_if_requested(args: &Args, dashboard: &mut Dashboard) -> Result<()> {
    let Some(ref path) = args.output else {
        return Ok(());
    };

    if dashboard.result().is_none() {
        warn!("No loaded result; skipping report file");
        return Ok(());
    }

    let snapshot = report::build_report(dashboard);
    let content = match args.format {
        OutputFormat::Json => report::generate_json_report(&snapshot)?,
        OutputFormat::Markdown => report::generate_markdown_report(&snapshot),
    };

    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    println!("\n✅ Report saved to: {}", path.display());
    Ok(())
}

/// Interactive `save` command: always markdown.
fn save_report(dashboard: &mut Dashboard, path: &str) {
    if dashboard.result().is_none() {
        println!("Nothing loaded yet; run 'refresh' first.");
        return;
    }

    let snapshot = report::build_report(dashboard);
    let content = report::generate_markdown_report(&snapshot);

    match std::fs::write(path, &content) {
        Ok(()) => println!("✅ Report saved to: {}", path),
        Err(e) => println!("❌ Failed to write {}: {}", path, e),
    }
}

/// Check the --fail-on threshold. Returns exit code (0 or 2).
fn check_fail_on(args: &Args, dashboard: &Dashboard) -> i32 {
    let Some(fail_level) = args.fail_on else {
        return 0;
    };

    let threshold = fail_on_to_risk(fail_level);
    let has_records_above = dashboard
        .records()
        .iter()
        .any(|r| r.risk_level.at_least(threshold));

    if has_records_above {
        eprintln!(
            "\n⛔ Records found at or above {:?} risk. Failing (exit code 2).",
            fail_level
        );
        return 2;
    }

    0
}

/// Convert FailOnLevel to RiskLevel for comparison.
fn fail_on_to_risk(level: FailOnLevel) -> RiskLevel {
    match level {
        FailOnLevel::Low => RiskLevel::Low,
        FailOnLevel::Medium => RiskLevel::Medium,
        FailOnLevel::High => RiskLevel::High,
        FailOnLevel::Critical => RiskLevel::Critical,
    }
}

/// The three detection rules of the analysis engine, for reference.
fn print_rules() {
    println!("Regras do motor de detecção:");
    println!("  1. Valor Irrisório: imóveis declarados por valores simbólicos (ex: R$ 0,10).");
    println!("  2. Indícios Textuais: termos como \"INVASÃO\", \"POSSE\", \"IRREGULAR\" na localidade.");
    println!("  3. Anomalia de Mercado: valor do m² muito abaixo da mediana do tipo de imóvel.");
}

fn print_help() {
    println!("Commands:");
    println!("  refresh (r)        fetch the analysis again");
    println!("  filter <text> (f)  filter the table by locality, registration or reason;");
    println!("                     'filter' alone clears the query");
    println!("  rules              show the detection rules");
    println!("  save [file]        write a markdown report (default fraudscope_report.md)");
    println!("  quit (q)           leave the session");
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
            info!("Loaded default config from .fraudscope.toml");
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
