use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StatsError};

#[derive(Debug, Deserialize)]
struct ApiRecord {
    player: ApiPlayer,
    #[serde(default)]
    statistics: Vec<ApiStatistics>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiPlayer {
    name: Option<String>,
    firstname: Option<String>,
    lastname: Option<String>,
    age: Option<u32>,
    nationality: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiStatistics {
    team: ApiNamed,
    league: ApiLeague,
    games: ApiGames,
    shots: ApiShots,
    goals: ApiGoals,
    passes: ApiPasses,
    tackles: ApiTackles,
    duels: ApiDuels,
    dribbles: ApiDribbles,
    fouls: ApiFouls,
    cards: ApiCards,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiNamed {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiLeague {
    id: Option<u32>,
}

// "appearences" is the API's own spelling.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiGames {
    appearences: Option<u32>,
    position: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiShots {
    total: Option<u32>,
    on: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiGoals {
    total: Option<u32>,
    conceded: Option<u32>,
    assists: Option<u32>,
    saves: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiPasses {
    accuracy: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiTackles {
    total: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiDuels {
    total: Option<u32>,
    won: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiDribbles {
    attempts: Option<u32>,
    success: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiFouls {
    committed: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiCards {
    yellow: Option<u32>,
    yellowred: Option<u32>,
    red: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Attacker,
    Defender,
    Midfielder,
    Goalkeeper,
}

impl Position {
    // Anything unrecognised gets the goalkeeper layout.
    fn from_api(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Attacker") => Position::Attacker,
            Some("Defender") => Position::Defender,
            Some("Midfielder") => Position::Midfielder,
            _ => Position::Goalkeeper,
        }
    }
}

/// Season snapshot for one player, as (label, value) lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Glance {
    pub name: String,
    pub position: Position,
    pub profile: Vec<(&'static str, String)>,
    pub season: Vec<(&'static str, String)>,
}

impl Glance {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.profile
            .iter()
            .chain(self.season.iter())
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (label, value) in &self.profile {
            out.push_str(&format!("{label}: {value}\n"));
        }
        out.push_str("\n2019/20 Stats:\n\n");
        for (label, value) in &self.season {
            out.push_str(&format!("{label}: {value}\n"));
        }
        out
    }
}

/// Builds the snapshot from a raw player record, using the statistics block of
/// `league_id` when the record carries several.
pub fn at_a_glance(record: &Value, league_id: u32) -> Result<Glance> {
    let parsed = ApiRecord::deserialize(record)
        .map_err(|err| StatsError::malformed(format!("player record: {err}")))?;
    let stats = parsed
        .statistics
        .iter()
        .find(|s| s.league.id == Some(league_id))
        .or_else(|| parsed.statistics.first())
        .ok_or_else(|| StatsError::malformed("player record has no statistics block"))?;

    let player = &parsed.player;
    let name = match (player.firstname.as_deref(), player.lastname.as_deref()) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        _ => player.name.clone().unwrap_or_default(),
    };
    let position = Position::from_api(stats.games.position.as_deref());

    let profile = vec![
        ("Name", name.clone()),
        ("Age", opt_text(player.age)),
        (
            "Position",
            stats.games.position.clone().unwrap_or_else(|| "n/a".to_string()),
        ),
        (
            "Current Club",
            stats.team.name.clone().unwrap_or_else(|| "n/a".to_string()),
        ),
        (
            "Nationality",
            player.nationality.clone().unwrap_or_else(|| "n/a".to_string()),
        ),
    ];

    let mut season = vec![("Appearances", opt_text(stats.games.appearences))];
    match position {
        Position::Attacker => {
            season.push(("Goals Scored", opt_text(stats.goals.total)));
            season.push(("Assists", opt_text(stats.goals.assists)));
            season.push(("Shot Accuracy", percent(stats.shots.on, stats.shots.total)));
        }
        Position::Defender => {
            season.push(("Goals Scored", opt_text(stats.goals.total)));
            season.push(("Tackles", opt_text(stats.tackles.total)));
            season.push(("Duel Success Rate", percent(stats.duels.won, stats.duels.total)));
            season.push(("Fouls Committed", opt_text(stats.fouls.committed)));
        }
        Position::Midfielder => {
            season.push(("Goals Scored", opt_text(stats.goals.total)));
            season.push(("Assists", opt_text(stats.goals.assists)));
            season.push(("Shot Accuracy", percent(stats.shots.on, stats.shots.total)));
            season.push((
                "Dribble Success Rate",
                percent(stats.dribbles.success, stats.dribbles.attempts),
            ));
            season.push(("Tackles", opt_text(stats.tackles.total)));
        }
        Position::Goalkeeper => {
            season.push(("Goals Conceded", opt_text(stats.goals.conceded)));
            season.push(("Saves", opt_text(stats.goals.saves)));
        }
    }
    season.push(("Passing Accuracy", passing_accuracy(stats.passes.accuracy.as_ref())));
    let reds = stats.cards.red.unwrap_or(0) + stats.cards.yellowred.unwrap_or(0);
    season.push((
        "Cards",
        format!("Yellow({}) Red({reds})", stats.cards.yellow.unwrap_or(0)),
    ));

    Ok(Glance {
        name,
        position,
        profile,
        season,
    })
}

fn opt_text(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn percent(part: Option<u32>, whole: Option<u32>) -> String {
    match (part, whole) {
        (Some(part), Some(whole)) if whole > 0 => {
            format!("{}%", (f64::from(part) * 100.0 / f64::from(whole)).round())
        }
        _ => "n/a".to_string(),
    }
}

fn passing_accuracy(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::Number(n)) => format!("{n}%"),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            let s = s.trim();
            if s.ends_with('%') {
                s.to_string()
            } else {
                format!("{s}%")
            }
        }
        _ => "n/a".to_string(),
    }
}
