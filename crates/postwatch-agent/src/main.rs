//! postwatch endpoint agent
//!
//! Samples the machine's security posture on a fixed interval, reports every
//! sample to the collector, and persists the last observed snapshot locally
//! so only actual changes touch the state file.

mod config;
mod cycle;
mod sink;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use postwatch_client::CollectorClient;
use postwatch_probe::{CommandProbe, LocalRunner, SystemProbe};

use crate::config::AgentConfig;
use crate::cycle::{CycleOutcome, run_cycle};
use crate::sink::HttpSink;
use crate::state::StateFile;

#[derive(Parser)]
#[command(name = "postwatch-agent")]
#[command(about = "Endpoint security posture agent", long_about = None)]
struct Cli {
    /// Path to the agent configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reporting loop on the configured interval
    Run,
    /// Run a single probe-report-diff cycle and exit
    Once,
    /// Sample the posture and print it without reporting
    Probe,
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::load_default()?,
    };

    match cli.command {
        Commands::Run => cmd_run(&config).await,
        Commands::Once => cmd_once(&config).await,
        Commands::Probe => cmd_probe(&config).await,
        Commands::Config => cmd_config(&config),
    }
}

fn build_probe(config: &AgentConfig) -> CommandProbe {
    CommandProbe::new(Arc::new(LocalRunner::new()))
        .with_timeout(Duration::from_secs(config.probe_timeout_secs))
}

fn build_sink(config: &AgentConfig) -> Result<HttpSink> {
    let client = CollectorClient::new(&config.collector_url)?;
    Ok(HttpSink::new(client))
}

async fn cmd_run(config: &AgentConfig) -> Result<()> {
    let probe = build_probe(config);
    let sink = build_sink(config)?;
    let state_file = StateFile::new(config.state_path.clone());

    info!(
        device_id = %config.device_id,
        collector = %config.collector_url,
        interval_secs = config.interval_secs,
        "agent starting"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match run_cycle(&config.device_id, &probe, &state_file, &sink).await {
                    Ok(report) => info!(outcome = ?report.outcome, "cycle finished"),
                    // a failed state write is not fatal; the next cycle retries
                    Err(e) => error!(error = %e, "cycle failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn cmd_once(config: &AgentConfig) -> Result<()> {
    let probe = build_probe(config);
    let sink = build_sink(config)?;
    let state_file = StateFile::new(config.state_path.clone());

    let report = run_cycle(&config.device_id, &probe, &state_file, &sink).await?;
    println!("{:?}", report.outcome);

    if report.outcome == CycleOutcome::SendFailed {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_probe(config: &AgentConfig) -> Result<()> {
    let probe = build_probe(config);
    let snapshot = probe.sample().await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn cmd_config(config: &AgentConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
