use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use pl1920_explorer::config::AppConfig;
use pl1920_explorer::demo_store;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_path = parse_db_path_arg().unwrap_or_else(|| AppConfig::from_env().db_path);
    let player_id = parse_player_arg().unwrap_or(demo_store::DEFAULT_LOOKUP_ID);

    let rows = demo_store::rebuild_and_lookup(&db_path, player_id)
        .with_context(|| format!("demo store at {}", db_path.display()))?;

    println!("DB: {}", db_path.display());
    if rows.is_empty() {
        println!("No sample rows for player {player_id}");
    }
    for row in rows {
        println!(
            "({}, '{}', '{}', {})",
            row.id, row.first_name, row.last_name, row.total_points
        );
    }
    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    arg_value("--db").map(PathBuf::from)
}

fn parse_player_arg() -> Option<u32> {
    arg_value("--player").and_then(|v| v.parse::<u32>().ok())
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefixed = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefixed) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
