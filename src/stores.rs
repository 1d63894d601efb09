//! The four canonical JSON stores plus the read-only standings override
//! file. Each store is a single JSON object keyed by decimal entity ID,
//! pretty-printed for human diffing, rewritten whole via temp file + rename.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const TOURNAMENTS_FILE: &str = "tournaments.json";
pub const EVENTS_FILE: &str = "singles-events.json";
pub const STANDINGS_FILE: &str = "singles-standings.json";
pub const PLAYERS_FILE: &str = "players.json";
pub const OVERRIDES_FILE: &str = "standings-to-players-override.json";
pub const FETCHED_DATA_DIR: &str = "fetched-data";

pub type TournamentStore = BTreeMap<u64, TournamentRecord>;
pub type EventStore = BTreeMap<u64, EventRecord>;
pub type StandingStore = BTreeMap<u64, StandingRecord>;
pub type PlayerStore = BTreeMap<u64, PlayerRecord>;
pub type OverrideStore = BTreeMap<u64, OverrideEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub event_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub start_at: Option<i64>,
    pub num_entrants: Option<u32>,
    pub tournament_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRecord {
    pub id: u64,
    pub tournament_id: u64,
    pub event_id: u64,
    pub player_id: Option<u64>,
    pub placement: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u64,
    pub name: Option<String>,
    pub standings: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub player_id: u64,
}

#[derive(Debug, Clone)]
pub struct StorePaths {
    data_dir: PathBuf,
}

impl StorePaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn fetched_data(&self) -> PathBuf {
        self.data_dir.join(FETCHED_DATA_DIR)
    }

    pub fn tournaments(&self) -> PathBuf {
        self.data_dir.join(TOURNAMENTS_FILE)
    }

    pub fn events(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE)
    }

    pub fn standings(&self) -> PathBuf {
        self.data_dir.join(STANDINGS_FILE)
    }

    pub fn players(&self) -> PathBuf {
        self.data_dir.join(PLAYERS_FILE)
    }

    pub fn overrides(&self) -> PathBuf {
        self.data_dir.join(OVERRIDES_FILE)
    }
}

/// In-memory state of the four canonical stores for one aggregation run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stores {
    pub tournaments: TournamentStore,
    pub events: EventStore,
    pub standings: StandingStore,
    pub players: PlayerStore,
}

pub fn load_stores(paths: &StorePaths) -> Result<Stores> {
    Ok(Stores {
        tournaments: load_json_map(&paths.tournaments())?,
        events: load_json_map(&paths.events())?,
        standings: load_json_map(&paths.standings())?,
        players: load_json_map(&paths.players())?,
    })
}

/// Flush every store as a whole-file replacement. With `skip_players` the
/// players file is left untouched on disk.
pub fn save_stores(paths: &StorePaths, stores: &Stores, skip_players: bool) -> Result<()> {
    save_json_map(&paths.tournaments(), &stores.tournaments)?;
    save_json_map(&paths.events(), &stores.events)?;
    save_json_map(&paths.standings(), &stores.standings)?;
    if !skip_players {
        save_json_map(&paths.players(), &stores.players)?;
    }
    Ok(())
}

pub fn load_overrides(paths: &StorePaths) -> Result<OverrideStore> {
    load_json_map(&paths.overrides())
}

/// Missing file means "start empty" and is informational, not an error.
pub fn load_json_map<T>(path: &Path) -> Result<BTreeMap<u64, T>>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        println!(
            "No existing data for {}. A new file will be created.",
            path.display()
        );
        return Ok(BTreeMap::new());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("read store {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse store {}", path.display()))
}

pub fn save_json_map<T>(path: &Path, map: &BTreeMap<u64, T>) -> Result<()>
where
    T: Serialize,
{
    let json = serde_json::to_string_pretty(map)
        .with_context(|| format!("serialize store {}", path.display()))?;
    write_atomic(path, &json)
}

/// Whole-file replacement: serialize fully, write a sibling temp file, then
/// rename over the target. A crash mid-write leaves the previous version.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
