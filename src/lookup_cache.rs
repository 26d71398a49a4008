use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::api_fetch::PlayerLookup;
use crate::error::{Result, StatsError};
use crate::names::PlayerName;

/// Player records keyed by the full name they were requested under.
///
/// Every miss goes to the fetcher once; the whole map is rewritten to disk
/// right after the new record is stored.
#[derive(Debug)]
pub struct PlayerCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl PlayerCache {
    /// Loads the cache file. A missing file yields an empty cache only when
    /// `allow_missing` is set; a malformed file is always an error.
    pub fn load(path: impl Into<PathBuf>, allow_missing: bool) -> Result<Self> {
        let path = path.into();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound && allow_missing => {
                info!("no cache at {}, starting empty", path.display());
                return Ok(Self::empty(path));
            }
            Err(err) => return Err(StatsError::io(path, err)),
        };
        let entries = serde_json::from_str::<BTreeMap<String, Value>>(&raw).map_err(|err| {
            StatsError::malformed(format!("cache file {}: {err}", path.display()))
        })?;
        debug!("loaded {} cached players from {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn cached(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn get(&mut self, name: &str, fetcher: &dyn PlayerLookup) -> Result<&Value> {
        if self.entries.contains_key(name) {
            info!("using cache for {name:?}");
        } else {
            info!("using api for {name:?}");
            let parsed = PlayerName::parse(name)?;
            let record = fetcher.fetch_player(&parsed)?;
            self.entries.insert(name.to_string(), record);
            // An entry only counts as cached once it is on disk.
            if let Err(err) = self.save() {
                self.entries.remove(name);
                return Err(err);
            }
        }
        self.entries
            .get(name)
            .ok_or_else(|| StatsError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| StatsError::io(dir, err))?;
        }
        let json = serde_json::to_string(&self.entries)
            .map_err(|err| StatsError::malformed(format!("serialize cache: {err}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|err| StatsError::io(&tmp, err))?;
        fs::rename(&tmp, &self.path).map_err(|err| StatsError::io(&self.path, err))?;
        Ok(())
    }
}
