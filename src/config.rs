use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://v3.football.api-sports.io";
pub const PREMIER_LEAGUE_ID: u32 = 39;

const DEFAULT_CACHE_PATH: &str = "api_cache.json";
const DEFAULT_STATS_CSV: &str = "players_1920_fin.csv";
const DEFAULT_NAMES_CSV: &str = "player_idlist.csv";
const DEFAULT_DB_PATH: &str = "pl.sqlite";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub league_id: u32,
    pub season: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache_path: PathBuf,
    /// Start with an empty cache when the cache file does not exist yet.
    pub cache_allow_missing: bool,
    pub stats_csv: PathBuf,
    pub names_csv: PathBuf,
    pub db_path: PathBuf,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = opt_env("APISPORTS_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_key = opt_env("APISPORTS_KEY").map(|s| s.trim().to_string());
        let league_id = opt_env("APISPORTS_LEAGUE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(PREMIER_LEAGUE_ID);
        let season = opt_env("APISPORTS_SEASON").and_then(|v| v.trim().parse::<u32>().ok());

        Self {
            base_url,
            api_key,
            league_id,
            season,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            league_id: PREMIER_LEAGUE_ID,
            season: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            cache_path: path_env("PL_CACHE_PATH", DEFAULT_CACHE_PATH),
            cache_allow_missing: env_bool("PL_CACHE_ALLOW_MISSING", true),
            stats_csv: path_env("PL_STATS_CSV", DEFAULT_STATS_CSV),
            names_csv: path_env("PL_NAMES_CSV", DEFAULT_NAMES_CSV),
            db_path: path_env("PL_DB_PATH", DEFAULT_DB_PATH),
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

fn path_env(key: &str, default: &str) -> PathBuf {
    opt_env(key)
        .map(|v| PathBuf::from(v.trim()))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
