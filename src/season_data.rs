use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::ops::Index;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, StatsError};
use crate::names::PlayerName;

pub const METRIC_COUNT: usize = 18;

/// Identifier and structural columns of the reshaped table, in order.
pub const ID_COLUMNS: [&str; 6] = [
    "id",
    "round",
    "first_name",
    "second_name",
    "team",
    "opponent_team",
];

/// Per-gameweek performance metrics, in reshaped column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    TotalPoints,
    Minutes,
    GoalsScored,
    Assists,
    Bonus,
    CleanSheets,
    GoalsConceded,
    IctIndex,
    OwnGoals,
    PenaltiesMissed,
    PenaltiesSaved,
    RedCards,
    Saves,
    Selected,
    TransfersBalance,
    Value,
    YellowCards,
    Ppm,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::TotalPoints,
        Metric::Minutes,
        Metric::GoalsScored,
        Metric::Assists,
        Metric::Bonus,
        Metric::CleanSheets,
        Metric::GoalsConceded,
        Metric::IctIndex,
        Metric::OwnGoals,
        Metric::PenaltiesMissed,
        Metric::PenaltiesSaved,
        Metric::RedCards,
        Metric::Saves,
        Metric::Selected,
        Metric::TransfersBalance,
        Metric::Value,
        Metric::YellowCards,
        Metric::Ppm,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalPoints => "total_points",
            Metric::Minutes => "minutes",
            Metric::GoalsScored => "goals_scored",
            Metric::Assists => "assists",
            Metric::Bonus => "bonus",
            Metric::CleanSheets => "clean_sheets",
            Metric::GoalsConceded => "goals_conceded",
            Metric::IctIndex => "ict_index",
            Metric::OwnGoals => "own_goals",
            Metric::PenaltiesMissed => "penalties_missed",
            Metric::PenaltiesSaved => "penalties_saved",
            Metric::RedCards => "red_cards",
            Metric::Saves => "saves",
            Metric::Selected => "selected",
            Metric::TransfersBalance => "transfers_balance",
            Metric::Value => "value",
            Metric::YellowCards => "yellow_cards",
            Metric::Ppm => "ppm",
        }
    }

    pub fn from_column(column: &str) -> Option<Metric> {
        Self::ALL.into_iter().find(|m| m.column() == column)
    }

    /// Rate and valuation metrics are averaged per player; everything else is summed.
    pub fn is_mean_aggregated(self) -> bool {
        matches!(
            self,
            Metric::IctIndex
                | Metric::Selected
                | Metric::TransfersBalance
                | Metric::Value
                | Metric::Ppm
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues([f64; METRIC_COUNT]);

impl MetricValues {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.0[metric.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

impl Index<Metric> for MetricValues {
    type Output = f64;

    fn index(&self, metric: Metric) -> &f64 {
        &self.0[metric.index()]
    }
}

/// Every column of the reshaped table, identifiers first.
pub fn season_columns() -> Vec<&'static str> {
    ID_COLUMNS
        .into_iter()
        .chain(Metric::ALL.into_iter().map(Metric::column))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameweekRow {
    pub id: u32,
    pub round: u32,
    pub first_name: String,
    pub second_name: String,
    pub team: String,
    pub opponent_team: u32,
    pub metrics: MetricValues,
}

impl GameweekRow {
    pub fn name(&self) -> PlayerName {
        PlayerName::from_parts(&self.first_name, &self.second_name)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        self.metrics.get(metric)
    }
}

#[derive(Debug, Deserialize)]
struct RawGameweek {
    element: u32,
    round: u32,
    team: String,
    opponent_team: u32,
    total_points: f64,
    minutes: f64,
    goals_scored: f64,
    assists: f64,
    bonus: f64,
    clean_sheets: f64,
    goals_conceded: f64,
    ict_index: f64,
    own_goals: f64,
    penalties_missed: f64,
    penalties_saved: f64,
    red_cards: f64,
    saves: f64,
    selected: f64,
    transfers_balance: f64,
    value: f64,
    yellow_cards: f64,
    ppm: f64,
}

impl RawGameweek {
    fn metric_values(&self) -> MetricValues {
        let mut values = MetricValues::default();
        for metric in Metric::ALL {
            let v = match metric {
                Metric::TotalPoints => self.total_points,
                Metric::Minutes => self.minutes,
                Metric::GoalsScored => self.goals_scored,
                Metric::Assists => self.assists,
                Metric::Bonus => self.bonus,
                Metric::CleanSheets => self.clean_sheets,
                Metric::GoalsConceded => self.goals_conceded,
                Metric::IctIndex => self.ict_index,
                Metric::OwnGoals => self.own_goals,
                Metric::PenaltiesMissed => self.penalties_missed,
                Metric::PenaltiesSaved => self.penalties_saved,
                Metric::RedCards => self.red_cards,
                Metric::Saves => self.saves,
                Metric::Selected => self.selected,
                Metric::TransfersBalance => self.transfers_balance,
                Metric::Value => self.value,
                Metric::YellowCards => self.yellow_cards,
                Metric::Ppm => self.ppm,
            };
            values.set(metric, v);
        }
        values
    }
}

#[derive(Debug, Deserialize)]
struct RawPlayerName {
    id: u32,
    first_name: String,
    second_name: String,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn require_headers(
    reader: &mut csv::Reader<impl Read>,
    table: &str,
    required: &[&str],
) -> Result<()> {
    let headers = reader
        .headers()
        .map_err(|err| StatsError::malformed(format!("{table}: unreadable header: {err}")))?;
    let present: HashSet<&str> = headers.iter().map(str::trim).collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !present.contains(col))
        .collect();
    if !missing.is_empty() {
        return Err(StatsError::malformed(format!(
            "{table}: missing required columns: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

fn load_stats_from_reader<R: Read>(rdr: R) -> Result<Vec<RawGameweek>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut required = vec!["element", "round", "team", "opponent_team"];
    required.extend(Metric::ALL.into_iter().map(Metric::column));
    require_headers(&mut reader, "season stats", &required)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawGameweek>() {
        let row = result.map_err(|err| StatsError::malformed(format!("season stats: {err}")))?;
        rows.push(row);
    }
    Ok(rows)
}

fn load_names_from_reader<R: Read>(rdr: R) -> Result<HashMap<u32, PlayerName>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    require_headers(&mut reader, "player id list", &["id", "first_name", "second_name"])?;

    let mut names = HashMap::new();
    for result in reader.deserialize::<RawPlayerName>() {
        let raw = result.map_err(|err| StatsError::malformed(format!("player id list: {err}")))?;
        let name = PlayerName::from_parts(&raw.first_name, &raw.second_name);
        if names.insert(raw.id, name).is_some() {
            return Err(StatsError::malformed(format!(
                "player id list: duplicate id {}",
                raw.id
            )));
        }
    }
    Ok(names)
}

/// Inner-joins per-gameweek stats to the id list and projects the fixed columns.
pub fn reshape_from_readers<S: Read, N: Read>(stats: S, names: N) -> Result<SeasonTable> {
    let raw_rows = load_stats_from_reader(stats)?;
    let names = load_names_from_reader(names)?;

    let mut seen = HashSet::with_capacity(raw_rows.len());
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut dropped = 0usize;
    for raw in raw_rows {
        let Some(name) = names.get(&raw.element) else {
            dropped += 1;
            continue;
        };
        if !seen.insert((raw.element, raw.round)) {
            return Err(StatsError::malformed(format!(
                "season stats: duplicate row for player {} in round {}",
                raw.element, raw.round
            )));
        }
        rows.push(GameweekRow {
            id: raw.element,
            round: raw.round,
            first_name: name.first.clone(),
            second_name: name.last.clone(),
            metrics: raw.metric_values(),
            team: raw.team,
            opponent_team: raw.opponent_team,
        });
    }
    if dropped > 0 {
        debug!("dropped {dropped} stat rows without a matching player id");
    }
    rows.sort_by_key(|row| (row.id, row.round));
    Ok(SeasonTable { rows })
}

pub fn load_season(stats_path: &Path, names_path: &Path) -> Result<SeasonTable> {
    let stats = File::open(stats_path).map_err(|err| StatsError::io(stats_path, err))?;
    let names = File::open(names_path).map_err(|err| StatsError::io(names_path, err))?;
    let table = reshape_from_readers(stats, names)?;
    info!(
        "loaded {} gameweek rows from {}",
        table.rows.len(),
        stats_path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Season table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SeasonTable {
    rows: Vec<GameweekRow>,
}

impl SeasonTable {
    /// Builds a table from already-shaped rows, canonicalised by (id, round).
    pub fn from_rows(mut rows: Vec<GameweekRow>) -> Self {
        rows.sort_by_key(|row| (row.id, row.round));
        Self { rows }
    }

    pub fn rows(&self) -> &[GameweekRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn player_rows(&self, name: &PlayerName) -> Vec<&GameweekRow> {
        self.rows
            .iter()
            .filter(|row| name.matches(&row.first_name, &row.second_name))
            .collect()
    }

    fn require_player(&self, name: &PlayerName) -> Result<Vec<&GameweekRow>> {
        let rows = self.player_rows(name);
        if rows.is_empty() {
            return Err(StatsError::NotFound {
                name: name.display(),
            });
        }
        Ok(rows)
    }

    /// (round, value) pairs for one player, in round order.
    pub fn series(&self, name: &PlayerName, metric: Metric) -> Result<Vec<(u32, f64)>> {
        Ok(self
            .require_player(name)?
            .into_iter()
            .map(|row| (row.round, row.metric(metric)))
            .collect())
    }

    pub fn season_total(&self, name: &PlayerName, metric: Metric) -> Result<f64> {
        Ok(self
            .require_player(name)?
            .into_iter()
            .map(|row| row.metric(metric))
            .sum())
    }

    /// Distinct team names, sorted.
    pub fn teams(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.team.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn team_week(&self, team: &str, round: u32) -> Vec<&GameweekRow> {
        let team = team.trim();
        self.rows
            .iter()
            .filter(|row| row.round == round && row.team.eq_ignore_ascii_case(team))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_identifiers_then_metrics() {
        let cols = season_columns();
        assert_eq!(cols.len(), 24);
        assert_eq!(&cols[..6], &ID_COLUMNS);
        assert_eq!(cols[6], "total_points");
        assert_eq!(cols[23], "ppm");
    }

    #[test]
    fn metric_columns_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_column(metric.column()), Some(metric));
        }
        assert_eq!(Metric::from_column("kickoff_time"), None);
    }

    #[test]
    fn mean_set_is_the_rate_metrics() {
        let means: Vec<&str> = Metric::ALL
            .into_iter()
            .filter(|m| m.is_mean_aggregated())
            .map(Metric::column)
            .collect();
        assert_eq!(
            means,
            vec!["ict_index", "selected", "transfers_balance", "value", "ppm"]
        );
    }
}
