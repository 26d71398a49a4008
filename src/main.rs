use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pl1920_explorer::api_fetch::ApiSportsFetcher;
use pl1920_explorer::commands::{self, Command, Session};
use pl1920_explorer::config::AppConfig;

/// Premier League 2019/20 player explorer.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Player lookup cache (JSON object keyed by full name).
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Per-gameweek season statistics CSV.
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Player id list CSV (id, first_name, second_name).
    #[arg(long, value_name = "FILE")]
    names: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env();
    if let Some(path) = cli.cache {
        cfg.cache_path = path;
    }
    if let Some(path) = cli.stats {
        cfg.stats_csv = path;
    }
    if let Some(path) = cli.names {
        cfg.names_csv = path;
    }

    let mut session = Session::load(&cfg).context("failed to load season data")?;
    let fetcher = ApiSportsFetcher::new(cfg.api.clone());
    let output = commands::execute(&cli.command, &mut session, &fetcher)
        .with_context(|| format!("{:?} failed", cli.command))?;
    print!("{output}");
    Ok(())
}
