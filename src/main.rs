use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use glp1_levels::output::{save_results, LevelReport};
use glp1_levels::{Config, DoseHistory};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glp1_levels")]
#[command(about = "Estimate remaining GLP-1 medication level and the next dose date")]
struct Cli {
    /// Dose history file (.json or .csv)
    #[arg(short, long)]
    doses: PathBuf,

    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the chart data and report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Evaluation instant (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Days between scheduled doses
    #[arg(long)]
    interval_days: Option<f64>,

    /// Fraction of the last dose below which the next dose is due
    #[arg(long)]
    minimum_fraction: Option<f64>,

    /// Hours between chart samples
    #[arg(long)]
    series_interval_hours: Option<f64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("failed to load configuration from {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    if let Some(days) = cli.interval_days {
        config.schedule.interval_days = days;
    }
    if let Some(fraction) = cli.minimum_fraction {
        config.schedule.minimum_fraction = fraction;
    }
    if let Some(hours) = cli.series_interval_hours {
        config.series.interval_hours = hours;
    }
    config.validate().context("invalid settings")?;

    let history = DoseHistory::from_file(&cli.doses)
        .with_context(|| format!("failed to load doses from {:?}", cli.doses))?;
    match history.most_recent() {
        Some(last) => info!("Last dose: {} mg at {}", last.amount, last.timestamp),
        None => warn!("Dose history is empty; no recommendation can be made"),
    }

    let at = cli.at.unwrap_or_else(Utc::now);
    let report = LevelReport::build(&history, &config, at);

    info!("Estimated level at {}: {:.3} mg", at, report.current_level);
    info!("Remaining of last dose: {:.1}%", report.percentage_remaining);
    match (report.next_dose, report.time_until_next_dose) {
        (Some(next), Some(left)) if left.is_overdue() => {
            warn!("Next dose was due {} ({:.1} h overdue)", next, -left.total_hours)
        }
        (Some(next), Some(left)) => {
            info!("Next dose due {} (in {}d {}h)", next, left.days, left.hours)
        }
        _ => info!("No next dose recommendation"),
    }

    if let Some(output) = &cli.output {
        std::fs::create_dir_all(output)
            .with_context(|| format!("failed to create output directory {:?}", output))?;
        save_results(&report, output)?;
        info!("Results saved to {:?}", output);
    }

    Ok(())
}
