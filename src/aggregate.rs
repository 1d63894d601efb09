//! Aggregation engine: folds raw page artifacts into the four canonical
//! stores. The merge steps are pure functions over in-memory maps; file I/O
//! happens only at the load/flush boundary in [`run`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::pages;
use crate::startgg::{self, EventNode, PageData, StandingNode, TournamentNode};
use crate::stores::{
    self, EventRecord, EventStore, OverrideStore, PlayerRecord, PlayerStore, StandingRecord,
    StandingStore, StorePaths, Stores, TournamentRecord, TournamentStore,
};

// Known non-competitive brackets that slipped through the API-side filters.
pub const EXCLUDED_EVENT_IDS: &[u64] = &[
    1238506, // Community Day 10/18/24, 3.02 event
    1238507, // Community Day 10/18/24, 3.6 event
    1092057, // Super TPS III, 3.6 event
    1092058, // Super TPS III, 3.02 event
];

pub const SIDE_EVENT_KEYWORDS: &[&str] = &[
    "random",
    "amateur",
    "bonus",
    "dorito",
    "side bracket",
    "side event",
    "character bans",
    "lethal league",
    "ban 5",
    "all-stars",
];

pub fn is_side_event(event_name: &str) -> bool {
    let lowered = event_name.to_lowercase();
    SIDE_EVENT_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

pub fn is_excluded_event(event: &EventNode) -> bool {
    EXCLUDED_EVENT_IDS.contains(&event.id) || is_side_event(&event.name)
}

/// Operator-feedback tallies for one merge. Non-authoritative; the stores
/// themselves are the source of truth.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeCounters {
    pub tournaments_added: usize,
    pub events_added: usize,
    pub standings_events: usize,
    pub players_added: usize,
    pub players_updated: usize,
}

impl MergeCounters {
    pub fn absorb(&mut self, other: MergeCounters) {
        self.tournaments_added += other.tournaments_added;
        self.events_added += other.events_added;
        self.standings_events += other.standings_events;
        self.players_added += other.players_added;
        self.players_updated += other.players_updated;
    }
}

/// Outcome of merging one page's tournament nodes.
#[derive(Debug, Default)]
pub struct PageMerge {
    pub counters: MergeCounters,
    /// One line per standings-bearing event processed, for progress output.
    pub events_processed: Vec<String>,
}

/// Tournament store merge: last-write-wins full replace keyed by tournament
/// ID. Nodes with a null ID are skipped entirely.
pub fn merge_tournaments(store: &mut TournamentStore, nodes: &[TournamentNode]) -> usize {
    let mut added = 0;
    for node in nodes {
        let Some(id) = node.id else {
            continue;
        };
        let event_ids = node
            .events
            .iter()
            .filter(|event| !is_excluded_event(event))
            .map(|event| event.id)
            .collect();
        store.insert(
            id,
            TournamentRecord {
                id,
                name: node.name.clone(),
                url: startgg::site_url(&node.slug),
                start_at: node.start_at,
                end_at: node.end_at,
                event_ids,
            },
        );
        added += 1;
    }
    added
}

/// Event store merge. Excluded events are dropped wholesale; everything else
/// is overwritten in place keyed by event ID.
pub fn merge_events(store: &mut EventStore, nodes: &[TournamentNode]) -> usize {
    let mut added = 0;
    for node in nodes {
        let Some(tournament_id) = node.id else {
            continue;
        };
        for event in &node.events {
            if is_excluded_event(event) {
                continue;
            }
            store.insert(
                event.id,
                EventRecord {
                    id: event.id,
                    name: event.name.clone(),
                    url: startgg::site_url(&event.slug),
                    start_at: event.start_at,
                    num_entrants: event.num_entrants,
                    tournament_id,
                },
            );
            added += 1;
        }
    }
    added
}

/// Player identity for a standing:
/// 1. the entrant's user ID when present,
/// 2. else the manual override entry for this standing ID,
/// 3. else none.
pub fn resolve_player_id(standing: &StandingNode, overrides: &OverrideStore) -> Option<u64> {
    if let Some(user_id) = standing.entrant_user_id() {
        return Some(user_id);
    }
    overrides.get(&standing.id).map(|entry| entry.player_id)
}

#[derive(Debug, Default)]
pub struct StandingsMerge {
    pub players_added: usize,
    pub players_updated: usize,
    /// Description of each standings-bearing event that was processed.
    pub events_processed: Vec<String>,
}

/// Standing + player store merge for every surviving, standings-bearing
/// event. Standing records are overwritten wholesale; player records are
/// created once and afterwards only appended to, never with a duplicate
/// standing ID. With `skip_players` the player store is left untouched.
pub fn merge_standings_and_players(
    standings: &mut StandingStore,
    players: &mut PlayerStore,
    overrides: &OverrideStore,
    nodes: &[TournamentNode],
    skip_players: bool,
) -> StandingsMerge {
    let mut merge = StandingsMerge::default();
    for node in nodes {
        let Some(tournament_id) = node.id else {
            continue;
        };
        for event in &node.events {
            if is_excluded_event(event) {
                continue;
            }
            let standing_nodes = event.standing_nodes();
            if standing_nodes.is_empty() {
                continue;
            }

            for standing in standing_nodes {
                let player_id = resolve_player_id(standing, overrides);
                standings.insert(
                    standing.id,
                    StandingRecord {
                        id: standing.id,
                        tournament_id,
                        event_id: event.id,
                        player_id,
                        placement: standing.placement,
                    },
                );

                if skip_players {
                    continue;
                }
                let Some(player_id) = player_id else {
                    continue;
                };
                if let Some(record) = players.get_mut(&player_id) {
                    if !record.standings.contains(&standing.id) {
                        record.standings.push(standing.id);
                        merge.players_updated += 1;
                    }
                } else {
                    players.insert(
                        player_id,
                        PlayerRecord {
                            id: player_id,
                            name: standing.entrant_gamer_tag().map(str::to_string),
                            standings: vec![standing.id],
                        },
                    );
                    merge.players_added += 1;
                }
            }

            merge.events_processed.push(format!(
                "{} (ID: {}) from tournament: {}",
                event.name, event.id, node.name
            ));
        }
    }
    merge
}

/// Merge one page of tournament nodes into all four stores.
pub fn merge_page(
    stores: &mut Stores,
    overrides: &OverrideStore,
    nodes: &[TournamentNode],
    skip_players: bool,
) -> PageMerge {
    let tournaments_added = merge_tournaments(&mut stores.tournaments, nodes);
    let events_added = merge_events(&mut stores.events, nodes);
    let standings = merge_standings_and_players(
        &mut stores.standings,
        &mut stores.players,
        overrides,
        nodes,
        skip_players,
    );
    PageMerge {
        counters: MergeCounters {
            tournaments_added,
            events_added,
            standings_events: standings.events_processed.len(),
            players_added: standings.players_added,
            players_updated: standings.players_updated,
        },
        events_processed: standings.events_processed,
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub start_page: u64,
    pub end_page: Option<u64>,
    pub skip_players: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: None,
            skip_players: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub pages_processed: usize,
    pub counters: MergeCounters,
}

/// One aggregation run: load the stores, fold the selected artifacts in page
/// order, flushing every store after each artifact completes. An error on
/// artifact K aborts the run but keeps the flushes for artifacts before K;
/// the failing artifact's own partial merge never reaches disk.
pub fn run(paths: &StorePaths, opts: &RunOptions) -> Result<RunSummary> {
    if opts.start_page < 1 {
        bail!("start page must be greater than 0");
    }
    if let Some(end_page) = opts.end_page
        && opts.start_page > end_page
    {
        bail!(
            "start page ({}) is greater than end page ({})",
            opts.start_page,
            end_page
        );
    }

    let overrides = stores::load_overrides(paths)?;
    let mut state = stores::load_stores(paths)?;

    let artifacts = pages::list_page_artifacts(&paths.fetched_data())?;
    let selected = pages::select_page_range(&artifacts, opts.start_page, opts.end_page);

    let mut summary = RunSummary::default();
    for path in selected {
        let merge = merge_artifact(&mut state, &overrides, path, opts.skip_players)?;
        stores::save_stores(paths, &state, opts.skip_players)?;
        report_artifact(paths, path, &merge, opts.skip_players);
        summary.pages_processed += 1;
        summary.counters.absorb(merge.counters);
    }
    Ok(summary)
}

fn merge_artifact(
    stores: &mut Stores,
    overrides: &OverrideStore,
    path: &Path,
    skip_players: bool,
) -> Result<PageMerge> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read artifact {}", path.display()))?;
    let page: PageData =
        serde_json::from_str(&raw).with_context(|| format!("parse artifact {}", path.display()))?;
    Ok(merge_page(
        stores,
        overrides,
        &page.tournaments.nodes,
        skip_players,
    ))
}

fn report_artifact(paths: &StorePaths, artifact: &Path, merge: &PageMerge, skip_players: bool) {
    let file_name = artifact
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    for event in &merge.events_processed {
        println!("Added standings for: {event}");
    }
    println!(
        "Successfully updated {} with {} tournaments from {file_name}",
        paths.tournaments().display(),
        merge.counters.tournaments_added
    );
    println!(
        "Successfully updated {} with {} events from {file_name}",
        paths.events().display(),
        merge.counters.events_added
    );
    println!(
        "Successfully updated {} with {} event standings from {file_name}",
        paths.standings().display(),
        merge.counters.standings_events
    );
    if skip_players {
        println!("Skipped player updates for {file_name}");
    } else {
        println!(
            "Added {} new players and updated {} players",
            merge.counters.players_added, merge.counters.players_updated
        );
    }
}
