use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use pl1920_explorer::api_fetch::PlayerLookup;
use pl1920_explorer::commands::{Command, Session, execute};
use pl1920_explorer::config::{ApiConfig, AppConfig, PREMIER_LEAGUE_ID};
use pl1920_explorer::lookup_cache::PlayerCache;
use pl1920_explorer::names::PlayerName;
use pl1920_explorer::season_data::load_season;
use pl1920_explorer::{Result, StatsError};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

/// Fails the test if the network is ever consulted.
struct NoNetwork;

impl PlayerLookup for NoNetwork {
    fn fetch_player(&self, name: &PlayerName) -> Result<Value> {
        panic!("unexpected remote lookup for {}", name.display());
    }
}

fn session(dir: &tempfile::TempDir) -> Session {
    let cache_path = dir.path().join("api_cache.json");
    fs::copy(fixture_path("api_cache.json"), &cache_path).unwrap();
    let cache = PlayerCache::load(&cache_path, false).unwrap();
    let season = load_season(
        &fixture_path("players_1920_sample.csv"),
        &fixture_path("player_idlist.csv"),
    )
    .unwrap();
    Session::new(PREMIER_LEAGUE_ID, cache, season).unwrap()
}

#[test]
fn glance_uses_cached_record_and_league_block() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let out = execute(
        &Command::Glance {
            name: "Lucas Torriera".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap();

    assert!(out.contains("Current Club: Arsenal"), "{out}");
    assert!(out.contains("Appearances: 29"), "{out}");
    assert!(out.contains("Shot Accuracy: 38%"), "{out}");
    assert!(out.contains("Dribble Success Rate: 63%"), "{out}");
    assert!(out.contains("Passing Accuracy: 82%"), "{out}");
    assert!(out.contains("Cards: Yellow(7) Red(1)"), "{out}");
}

#[test]
fn trend_lists_each_round() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let out = execute(
        &Command::Trend {
            name: "Lucas Torriera".to_string(),
            metric: "Goals Scored".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Week-Wise Goals Scored Trend for Lucas Torriera");
    assert_eq!(lines.len(), 5);
    assert!(lines[4].trim_start().starts_with("3  2"));
}

#[test]
fn bar_reports_season_totals() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let out = execute(
        &Command::Bar {
            player1: "Lucas Torriera".to_string(),
            player2: "Steven Cook".to_string(),
            metric: "minutes".to_string(),
            second_metric: Some("1".to_string()),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap();

    assert!(out.contains("Minutes: Lucas Torriera=198  Steven Cook=180"), "{out}");
    assert!(out.contains("Total Points: Lucas Torriera=17  Steven Cook=3"), "{out}");
}

#[test]
fn team_week_accepts_team_number() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let out = execute(
        &Command::TeamWeek {
            team: "3".to_string(),
            week: 2,
            x_metric: "minutes".to_string(),
            y_metric: "assists".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap();

    assert!(out.starts_with("Week 2 Comparison for Bournemouth (Minutes vs Assists)"));
    assert!(out.contains("Steven Cook  90  1"), "{out}");
}

#[test]
fn radar_requires_five_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let cmd = Command::Radar {
        player1: "Lucas Torriera".to_string(),
        player2: "Steven Cook".to_string(),
        metrics: vec!["1".to_string(), "2".to_string()],
    };
    assert!(matches!(
        execute(&cmd, &mut session, &NoNetwork),
        Err(StatsError::MalformedInput(_))
    ));

    let cmd = Command::Radar {
        player1: "Lucas Torriera".to_string(),
        player2: "Steven Cook".to_string(),
        metrics: ["1", "2", "3", "4", "5"].map(String::from).to_vec(),
    };
    let out = execute(&cmd, &mut session, &NoNetwork).unwrap();
    assert!(out.starts_with("Radar Plot: Lucas Torriera vs Steven Cook"));
    assert!(out.contains("Total Points: Lucas Torriera=5.00"), "{out}");
}

#[test]
fn unknown_metric_is_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let err = execute(
        &Command::Trend {
            name: "Lucas Torriera".to_string(),
            metric: "Opponent Team".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap_err();
    assert!(matches!(err, StatsError::MalformedInput(_)));
}

#[test]
fn menus_are_numbered_from_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(&dir);
    let metrics = execute(&Command::Metrics, &mut session, &NoNetwork).unwrap();
    assert!(metrics.starts_with("1) Total Points\n"));
    assert!(metrics.contains("8) ICT Index\n"));
    assert!(metrics.ends_with("18) Points per Million\n"));

    let teams = execute(&Command::Teams, &mut session, &NoNetwork).unwrap();
    assert_eq!(teams, "1) Arsenal\n2) Aston Villa\n3) Bournemouth\n4) Sheffield Utd\n");
}

fn config_with_cache(dir: &tempfile::TempDir, cache_body: &str) -> AppConfig {
    let cache_path = dir.path().join("api_cache.json");
    fs::write(&cache_path, cache_body).unwrap();
    AppConfig {
        api: ApiConfig::default(),
        cache_path,
        cache_allow_missing: false,
        stats_csv: fixture_path("players_1920_sample.csv"),
        names_csv: fixture_path("player_idlist.csv"),
        db_path: dir.path().join("pl.sqlite"),
    }
}

#[test]
fn dataset_commands_ignore_a_broken_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_with_cache(&dir, "{ not json");
    let mut session = Session::load(&cfg).unwrap();
    assert!(!session.cache_loaded());

    let metrics = execute(&Command::Metrics, &mut session, &NoNetwork).unwrap();
    assert!(metrics.starts_with("1) Total Points\n"));
    let trend = execute(
        &Command::Trend {
            name: "Lucas Torriera".to_string(),
            metric: "Goals Scored".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap();
    assert!(trend.starts_with("Week-Wise Goals Scored Trend"));
    assert!(!session.cache_loaded());

    let err = execute(
        &Command::Glance {
            name: "Lucas Torriera".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap_err();
    assert!(matches!(err, StatsError::MalformedInput(_)));
    assert!(!session.cache_loaded());
}

#[test]
fn glance_loads_cache_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let body = fs::read_to_string(fixture_path("api_cache.json")).unwrap();
    let cfg = config_with_cache(&dir, &body);
    let mut session = Session::load(&cfg).unwrap();
    assert!(!session.cache_loaded());

    let out = execute(
        &Command::Glance {
            name: "Lucas Torriera".to_string(),
        },
        &mut session,
        &NoNetwork,
    )
    .unwrap();
    assert!(out.contains("Current Club: Arsenal"), "{out}");
    assert!(session.cache_loaded());
    assert!(session.cache().unwrap().contains("Lucas Torriera"));
}
