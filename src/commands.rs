use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use clap::Subcommand;
use tracing::info;

use crate::aggregate::{SummaryTable, aggregate};
use crate::api_fetch::PlayerLookup;
use crate::config::AppConfig;
use crate::error::{Result, StatsError};
use crate::glance::at_a_glance;
use crate::labels::LabelTable;
use crate::lookup_cache::PlayerCache;
use crate::names::PlayerName;
use crate::season_data::{Metric, SeasonTable, load_season, season_columns};

pub const RADAR_METRICS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Season snapshot for one player from the sports API (cached).
    Glance { name: String },
    /// Week-by-week values of one metric for a player.
    Trend { name: String, metric: String },
    /// Two metrics against each other across a player's gameweeks.
    Scatter {
        name: String,
        x_metric: String,
        y_metric: String,
    },
    /// Week-by-week values of one metric for two players.
    CompareTrend {
        player1: String,
        player2: String,
        metric: String,
    },
    /// Every player of a team in one gameweek, two metrics.
    TeamWeek {
        /// Team name or its number from `teams`.
        team: String,
        week: u32,
        x_metric: String,
        y_metric: String,
    },
    /// Season totals of one or two metrics for two players.
    Bar {
        player1: String,
        player2: String,
        metric: String,
        second_metric: Option<String>,
    },
    /// Five metrics for two players, scaled 0-5 against the league best.
    Radar {
        player1: String,
        player2: String,
        #[arg(num_args = 1..)]
        metrics: Vec<String>,
    },
    /// List the selectable metrics.
    Metrics,
    /// List the teams in the dataset.
    Teams,
}

/// Lookup cache that is only read from disk by the first command needing it.
enum CacheSlot {
    Pending { path: PathBuf, allow_missing: bool },
    Ready(PlayerCache),
}

/// Everything a command may read or update, built once at start-up.
pub struct Session {
    pub league_id: u32,
    pub season: SeasonTable,
    pub summaries: SummaryTable,
    pub labels: LabelTable,
    cache: CacheSlot,
}

impl Session {
    pub fn new(league_id: u32, cache: PlayerCache, season: SeasonTable) -> Result<Self> {
        Self::build(league_id, CacheSlot::Ready(cache), season)
    }

    /// Reads the season dataset now; the lookup cache waits until `glance` runs.
    pub fn load(cfg: &AppConfig) -> Result<Self> {
        let season = load_season(&cfg.stats_csv, &cfg.names_csv)?;
        let cache = CacheSlot::Pending {
            path: cfg.cache_path.clone(),
            allow_missing: cfg.cache_allow_missing,
        };
        Self::build(cfg.api.league_id, cache, season)
    }

    fn build(league_id: u32, cache: CacheSlot, season: SeasonTable) -> Result<Self> {
        let labels = LabelTable::build(&season_columns())?;
        let summaries = aggregate(season.rows());
        info!(
            "season table ready: {} rows, {} players",
            season.len(),
            summaries.len()
        );
        Ok(Self {
            league_id,
            season,
            summaries,
            labels,
            cache,
        })
    }

    pub fn cache_loaded(&self) -> bool {
        matches!(self.cache, CacheSlot::Ready(_))
    }

    /// The lookup cache, loading it on first use. A failed load is retried next time.
    pub fn cache(&mut self) -> Result<&mut PlayerCache> {
        if let CacheSlot::Pending {
            path,
            allow_missing,
        } = &self.cache
        {
            let cache = PlayerCache::load(path, *allow_missing)?;
            self.cache = CacheSlot::Ready(cache);
        }
        match &mut self.cache {
            CacheSlot::Ready(cache) => Ok(cache),
            CacheSlot::Pending { .. } => {
                Err(StatsError::Config("lookup cache not loaded".into()))
            }
        }
    }
}

pub fn execute(
    cmd: &Command,
    session: &mut Session,
    fetcher: &dyn PlayerLookup,
) -> Result<String> {
    match cmd {
        Command::Glance { name } => {
            let league_id = session.league_id;
            let record = session.cache()?.get(name.trim(), fetcher)?;
            Ok(at_a_glance(record, league_id)?.render())
        }
        Command::Trend { name, metric } => {
            let name = PlayerName::parse(name)?;
            let metric = session.labels.resolve(metric)?;
            let label = session.labels.metric_label(metric);
            let series = session.season.series(&name, metric)?;

            let mut out = format!("Week-Wise {label} Trend for {}\n", name.display());
            writeln!(out, "{:>5}  {label}", "Round").ok();
            for (round, value) in series {
                writeln!(out, "{round:>5}  {}", fmt_value(value)).ok();
            }
            Ok(out)
        }
        Command::Scatter {
            name,
            x_metric,
            y_metric,
        } => {
            let name = PlayerName::parse(name)?;
            let x = session.labels.resolve(x_metric)?;
            let y = session.labels.resolve(y_metric)?;
            let (x_label, y_label) = (
                session.labels.metric_label(x),
                session.labels.metric_label(y),
            );
            let rows = session.season.player_rows(&name);
            if rows.is_empty() {
                return Err(StatsError::NotFound {
                    name: name.display(),
                });
            }

            let mut out = format!(
                "Scatter Plot: {x_label} vs {y_label} Trend for {}\n",
                name.display()
            );
            writeln!(out, "{:>5}  {x_label}  {y_label}", "Round").ok();
            for row in rows {
                writeln!(
                    out,
                    "{:>5}  {}  {}",
                    row.round,
                    fmt_value(row.metric(x)),
                    fmt_value(row.metric(y))
                )
                .ok();
            }
            Ok(out)
        }
        Command::CompareTrend {
            player1,
            player2,
            metric,
        } => {
            let p1 = PlayerName::parse(player1)?;
            let p2 = PlayerName::parse(player2)?;
            let metric = session.labels.resolve(metric)?;
            let label = session.labels.metric_label(metric);

            let mut by_round: BTreeMap<u32, (Option<f64>, Option<f64>)> = BTreeMap::new();
            for (round, value) in session.season.series(&p1, metric)? {
                by_round.entry(round).or_default().0 = Some(value);
            }
            for (round, value) in session.season.series(&p2, metric)? {
                by_round.entry(round).or_default().1 = Some(value);
            }

            let (n1, n2) = (p1.display(), p2.display());
            let mut out = format!("Week-Wise {label} Trend for {n1} vs {n2}\n");
            writeln!(out, "{:>5}  {n1}  {n2}", "Round").ok();
            for (round, (a, b)) in by_round {
                writeln!(out, "{round:>5}  {}  {}", fmt_opt(a), fmt_opt(b)).ok();
            }
            Ok(out)
        }
        Command::TeamWeek {
            team,
            week,
            x_metric,
            y_metric,
        } => {
            let team = resolve_team(&session.season, team)?;
            let x = session.labels.resolve(x_metric)?;
            let y = session.labels.resolve(y_metric)?;
            let (x_label, y_label) = (
                session.labels.metric_label(x),
                session.labels.metric_label(y),
            );

            let mut out =
                format!("Week {week} Comparison for {team} ({x_label} vs {y_label})\n");
            let rows = session.season.team_week(&team, *week);
            if rows.is_empty() {
                writeln!(out, "no rows for {team} in week {week}").ok();
            }
            for row in rows {
                writeln!(
                    out,
                    "{}  {}  {}",
                    row.display_name(),
                    fmt_value(row.metric(x)),
                    fmt_value(row.metric(y))
                )
                .ok();
            }
            Ok(out)
        }
        Command::Bar {
            player1,
            player2,
            metric,
            second_metric,
        } => {
            let p1 = PlayerName::parse(player1)?;
            let p2 = PlayerName::parse(player2)?;
            let mut metrics = vec![session.labels.resolve(metric)?];
            if let Some(second) = second_metric.as_deref().filter(|m| !m.trim().is_empty()) {
                metrics.push(session.labels.resolve(second)?);
            }

            let (n1, n2) = (p1.display(), p2.display());
            let mut out = if metrics.len() == 1 {
                format!("{n1} vs {n2}: {}\n", session.labels.metric_label(metrics[0]))
            } else {
                format!("{n1} vs {n2}\n")
            };
            for metric in metrics {
                let a = session.season.season_total(&p1, metric)?;
                let b = session.season.season_total(&p2, metric)?;
                writeln!(
                    out,
                    "{}: {n1}={}  {n2}={}",
                    session.labels.metric_label(metric),
                    fmt_value(a),
                    fmt_value(b)
                )
                .ok();
            }
            Ok(out)
        }
        Command::Radar {
            player1,
            player2,
            metrics,
        } => {
            if metrics.len() != RADAR_METRICS {
                return Err(StatsError::malformed(format!(
                    "radar needs exactly {RADAR_METRICS} metrics, got {}",
                    metrics.len()
                )));
            }
            let metrics = metrics
                .iter()
                .map(|m| session.labels.resolve(m))
                .collect::<Result<Vec<Metric>>>()?;
            let a = session
                .summaries
                .radar_scores(&PlayerName::parse(player1)?, &metrics)?;
            let b = session
                .summaries
                .radar_scores(&PlayerName::parse(player2)?, &metrics)?;

            let mut out = format!("Radar Plot: {} vs {}\n", a.player, b.player);
            for (idx, metric) in metrics.iter().enumerate() {
                writeln!(
                    out,
                    "{}: {}={:.2}  {}={:.2}",
                    session.labels.metric_label(*metric),
                    a.player,
                    a.scores[idx],
                    b.player,
                    b.scores[idx]
                )
                .ok();
            }
            Ok(out)
        }
        Command::Metrics => {
            let mut out = String::new();
            for (idx, (label, _)) in session.labels.selectable().iter().enumerate() {
                writeln!(out, "{}) {label}", idx + 1).ok();
            }
            Ok(out)
        }
        Command::Teams => {
            let mut out = String::new();
            for (idx, team) in session.season.teams().iter().enumerate() {
                writeln!(out, "{}) {team}", idx + 1).ok();
            }
            Ok(out)
        }
    }
}

/// Accepts a team name (any case) or its 1-based position in the sorted team list.
fn resolve_team(season: &SeasonTable, input: &str) -> Result<String> {
    let teams = season.teams();
    let input = input.trim();
    let found = match input.parse::<usize>() {
        Ok(idx) => idx.checked_sub(1).and_then(|i| teams.get(i)).cloned(),
        Err(_) => teams.iter().find(|t| t.eq_ignore_ascii_case(input)).cloned(),
    };
    found.ok_or_else(|| StatsError::malformed(format!("unknown team {input:?}")))
}

fn fmt_value(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(fmt_value).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_print_without_trailing_zeros() {
        assert_eq!(fmt_value(3.0), "3");
        assert_eq!(fmt_value(52.5), "52.5");
        assert_eq!(fmt_value(-1.25), "-1.25");
        assert_eq!(fmt_value(2.999), "3");
        assert_eq!(fmt_value(0.004), "0");
        assert_eq!(fmt_value(-0.001), "0");
        assert_eq!(fmt_value(10.0), "10");
        assert_eq!(fmt_value(0.10), "0.1");
        assert_eq!(fmt_opt(None), "-");
    }
}
