use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{Result, StatsError};
use crate::http_client::http_client;
use crate::names::PlayerName;

const API_KEY_HEADER: &str = "x-apisports-key";

/// Resolves a player name to the raw record the remote API holds for it.
pub trait PlayerLookup {
    fn fetch_player(&self, name: &PlayerName) -> Result<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Found(Value),
    Ambiguous(Vec<String>),
    NotFound,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: u32,
    #[serde(default)]
    errors: Value,
    #[serde(default)]
    response: Vec<Value>,
}

pub struct ApiSportsFetcher {
    cfg: ApiConfig,
}

impl ApiSportsFetcher {
    pub fn new(cfg: ApiConfig) -> Self {
        Self { cfg }
    }

    fn search_raw(&self, surname: &str) -> Result<String> {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            return Err(StatsError::Config(
                "APISPORTS_KEY is not set; cannot query the players endpoint".to_string(),
            ));
        };
        let client = http_client()?;
        let url = format!("{}/players", self.cfg.base_url);
        let mut query = vec![
            ("league", self.cfg.league_id.to_string()),
            ("search", surname.to_string()),
        ];
        if let Some(season) = self.cfg.season {
            query.push(("season", season.to_string()));
        }

        let send = || {
            client
                .get(&url)
                .header(API_KEY_HEADER, api_key)
                .query(&query)
                .send()
        };
        // One retry on transport failure; HTTP error statuses are final.
        let resp = match send() {
            Ok(resp) => resp,
            Err(err) => {
                warn!("players request for {surname:?} failed ({err}), retrying once");
                send().map_err(|err| StatsError::Http(format!("request failed: {err}")))?
            }
        };

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| StatsError::Http(format!("failed reading body: {err}")))?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StatsError::Config(format!("api rejected credentials: http {status}")));
        }
        if !status.is_success() {
            return Err(StatsError::Http(format!("http {status}: {body}")));
        }
        Ok(body)
    }
}

impl PlayerLookup for ApiSportsFetcher {
    fn fetch_player(&self, name: &PlayerName) -> Result<Value> {
        let raw = self.search_raw(&name.last)?;
        let candidates = parse_search_response(&raw)?;
        debug!(
            "players search {:?} returned {} candidates",
            name.last,
            candidates.len()
        );
        match disambiguate(name, candidates) {
            MatchOutcome::Found(record) => Ok(record),
            MatchOutcome::NotFound => Err(StatsError::NotFound {
                name: name.display(),
            }),
            MatchOutcome::Ambiguous(candidates) => Err(StatsError::AmbiguousMatch {
                name: name.display(),
                candidates,
            }),
        }
    }
}

/// Parses a players search body into its candidate records.
pub fn parse_search_response(raw: &str) -> Result<Vec<Value>> {
    let parsed: SearchResponse = serde_json::from_str(raw)
        .map_err(|err| StatsError::malformed(format!("players search response: {err}")))?;
    if has_api_errors(&parsed.errors) {
        return Err(StatsError::Http(format!("api reported errors: {}", parsed.errors)));
    }
    if parsed.results as usize != parsed.response.len() {
        debug!(
            "players search reported {} results but carried {}",
            parsed.results,
            parsed.response.len()
        );
    }
    Ok(parsed.response)
}

/// Picks the candidate for `name`.
///
/// A single candidate is accepted as-is. With several, the first whose
/// `player.name` is the full name or the initialed form wins.
pub fn disambiguate(name: &PlayerName, candidates: Vec<Value>) -> MatchOutcome {
    if candidates.len() <= 1 {
        return match candidates.into_iter().next() {
            Some(record) => MatchOutcome::Found(record),
            None => MatchOutcome::NotFound,
        };
    }

    let full = name.display();
    let initialed = name.initialed();
    let mut seen = Vec::with_capacity(candidates.len());
    for record in candidates {
        let listed = candidate_name(&record).unwrap_or_default().to_string();
        if listed == full || listed == initialed {
            return MatchOutcome::Found(record);
        }
        seen.push(listed);
    }
    MatchOutcome::Ambiguous(seen)
}

pub fn candidate_name(record: &Value) -> Option<&str> {
    record.get("player")?.get("name")?.as_str()
}

fn has_api_errors(errors: &Value) -> bool {
    match errors {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(name: &str, id: u32) -> Value {
        json!({ "player": { "id": id, "name": name }, "statistics": [] })
    }

    #[test]
    fn single_candidate_is_accepted_without_name_check() {
        let name = PlayerName::parse("Lucas Torriera").unwrap();
        let outcome = disambiguate(&name, vec![candidate("Someone Else", 1)]);
        assert_eq!(outcome, MatchOutcome::Found(candidate("Someone Else", 1)));
    }

    #[test]
    fn empty_result_is_not_found() {
        let name = PlayerName::parse("Nobody Here").unwrap();
        assert_eq!(disambiguate(&name, Vec::new()), MatchOutcome::NotFound);
    }

    #[test]
    fn first_initialed_match_wins() {
        let name = PlayerName::parse("Ben Davies").unwrap();
        let outcome = disambiguate(
            &name,
            vec![
                candidate("T. Davies", 1),
                candidate("B. Davies", 2),
                candidate("Ben Davies", 3),
            ],
        );
        assert_eq!(outcome, MatchOutcome::Found(candidate("B. Davies", 2)));
    }

    #[test]
    fn no_matching_candidate_is_ambiguous() {
        let name = PlayerName::parse("Ben Davies").unwrap();
        let outcome = disambiguate(
            &name,
            vec![candidate("T. Davies", 1), candidate("C. Davies", 2)],
        );
        assert_eq!(
            outcome,
            MatchOutcome::Ambiguous(vec!["T. Davies".to_string(), "C. Davies".to_string()])
        );
    }

    #[test]
    fn api_error_object_is_surfaced() {
        let raw = r#"{"results":0,"errors":{"token":"missing"},"response":[]}"#;
        assert!(matches!(
            parse_search_response(raw),
            Err(StatsError::Http(_))
        ));
    }

    #[test]
    fn empty_error_list_parses() {
        let raw = r#"{"results":1,"errors":[],"response":[{"player":{"name":"L. Torreira"}}]}"#;
        let rows = parse_search_response(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(candidate_name(&rows[0]), Some("L. Torreira"));
    }

    #[test]
    fn missing_key_is_config_error() {
        let fetcher = ApiSportsFetcher::new(ApiConfig::default());
        let name = PlayerName::parse("Lucas Torriera").unwrap();
        assert!(matches!(
            fetcher.fetch_player(&name),
            Err(StatsError::Config(_))
        ));
    }
}
