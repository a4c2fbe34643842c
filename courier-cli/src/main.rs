//! courier CLI - delivery-logistics dashboards in the terminal

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr, reports to stdout

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use courier_core::config::{self, ResolvedConfig};
use courier_core::filter::TrafficSelection;
use courier_core::normalize::parse_order_date;
use courier_core::{analyze, loader, render_json, render_text, Page, Pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Cleaning and dashboards for delivery-logistics order exports")]
#[command(version = env!("COURIER_VERSION"))]
struct Cli {
    /// Log pipeline stages (repeat for more detail; RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Orders over time, by traffic, and by location
    Company(PageArgs),
    /// Delivery people: ages, vehicles, ratings, speed rankings
    Delivery(PageArgs),
    /// Restaurants: distances and delivery-time distributions
    Restaurant(PageArgs),
    /// Write the normalized dataset as CSV
    Clean {
        /// Order export to read (default: `data` from config)
        path: Option<PathBuf>,

        /// Where to write the cleaned CSV
        #[arg(long, short)]
        output: PathBuf,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Order export to read (default: `data` from config)
    path: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Only orders placed before this date, DD-MM-YYYY (overrides config file)
    #[arg(long)]
    until: Option<String>,

    /// Traffic densities to select, comma separated (overrides config file)
    #[arg(long, value_delimiter = ',')]
    traffic: Option<Vec<String>>,

    /// Restrict the page to the traffic selection
    #[arg(long)]
    apply_traffic_filter: bool,

    /// Delivery people per city in speed rankings (overrides config file)
    #[arg(long)]
    top: Option<usize>,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without loading data
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Company(args) => run_page(Page::Company, args),
        Commands::Delivery(args) => run_page(Page::Delivery, args),
        Commands::Restaurant(args) => run_page(Page::Restaurant, args),
        Commands::Clean {
            path,
            output,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let data_path = data_path(path, &resolved)?;

            // Cleaning exports every usable row: no cutoff, no traffic selection
            let dataset = Pipeline::default().load(&data_path)?;
            loader::write_clean_file(&output, &dataset.records)?;

            let summary = &dataset.summary;
            println!(
                "Wrote {} of {} rows to {} ({} dropped)",
                summary.rows_kept,
                summary.rows_read,
                output.display(),
                summary.rows_dropped()
            );
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                        Ok(())
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print!("{}", describe_config(&resolved));
                Ok(())
            }
        },
    }
}

fn run_page(page: Page, args: PageArgs) -> anyhow::Result<()> {
    let mut resolved = load_config(args.config.as_deref())?;

    // CLI flags override config file values
    if let Some(until) = args.until.as_deref() {
        resolved.until = Some(
            parse_order_date(until)
                .with_context(|| format!("--until must be DD-MM-YYYY (got {:?})", until))?,
        );
    }
    if let Some(traffic) = args.traffic.as_deref() {
        resolved.traffic = TrafficSelection::new(traffic).context("invalid --traffic")?;
    }
    if args.apply_traffic_filter {
        resolved.apply_traffic_filter = true;
    }
    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be at least 1");
        }
        resolved.top_n = top;
    }

    let data_path = data_path(args.path, &resolved)?;
    let report = analyze(&data_path, page, &resolved)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)),
    }
    Ok(())
}

fn load_config(config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;
    if let Some(path) = &resolved.config_path {
        tracing::info!(path = %path.display(), "using config");
    }
    Ok(resolved)
}

fn data_path(path: Option<PathBuf>, config: &ResolvedConfig) -> anyhow::Result<PathBuf> {
    let path = match path.or_else(|| config.data.clone()) {
        Some(path) => path,
        None => anyhow::bail!("no order export given (pass a path or set `data` in config)"),
    };
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    Ok(path)
}

fn describe_config(resolved: &ResolvedConfig) -> String {
    let mut out = String::from("Configuration:\n");
    match &resolved.config_path {
        Some(p) => out.push_str(&format!("  Source: {}\n", p.display())),
        None => out.push_str("  Source: defaults (no config file found)\n"),
    }
    out.push_str(&format!(
        "  data: {}\n",
        resolved
            .data
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    out.push_str(&format!(
        "  until: {}\n",
        resolved
            .until
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    out.push_str(&format!(
        "  traffic: {}\n",
        resolved.traffic.categories().join(", ")
    ));
    out.push_str(&format!(
        "  apply_traffic_filter: {}\n",
        resolved.apply_traffic_filter
    ));
    out.push_str(&format!("  top: {}\n", resolved.top_n));
    out
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
