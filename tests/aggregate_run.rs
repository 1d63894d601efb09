use std::fs;
use std::path::{Path, PathBuf};

use tourney_results::aggregate::{self, RunOptions};
use tourney_results::stores::{self, StorePaths};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn seed_data_dir(dir: &Path) -> StorePaths {
    let paths = StorePaths::new(dir);
    let fetched = paths.fetched_data();
    fs::create_dir_all(&fetched).expect("create fetched-data dir");
    fs::write(
        fetched.join("page1-response.json"),
        read_fixture("page1_response.json"),
    )
    .expect("write artifact");
    fs::write(
        paths.overrides(),
        r#"{"301": {"player_id": 2}}"#,
    )
    .expect("write overrides");
    paths
}

fn store_snapshot(paths: &StorePaths) -> Vec<String> {
    [
        paths.tournaments(),
        paths.events(),
        paths.standings(),
        paths.players(),
    ]
    .iter()
    .map(|path| fs::read_to_string(path).expect("store file should exist"))
    .collect()
}

#[test]
fn end_to_end_scenario_produces_all_four_stores() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());

    let summary = aggregate::run(&paths, &RunOptions::default()).expect("run");
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.counters.tournaments_added, 1);
    assert_eq!(summary.counters.events_added, 1);
    assert_eq!(summary.counters.standings_events, 1);
    assert_eq!(summary.counters.players_added, 2);
    assert_eq!(summary.counters.players_updated, 0);

    let stores = stores::load_stores(&paths).expect("reload stores");

    let tournament = stores.tournaments.get(&100).expect("tournament 100");
    assert_eq!(tournament.name, "Tripoint 5");
    assert_eq!(tournament.url, "https://start.gg/t5");
    assert_eq!(tournament.start_at, Some(1000));
    assert_eq!(tournament.end_at, Some(2000));
    assert_eq!(tournament.event_ids, vec![200]);

    let event = stores.events.get(&200).expect("event 200");
    assert_eq!(event.name, "Singles");
    assert_eq!(event.tournament_id, 100);
    assert_eq!(event.num_entrants, Some(8));
    assert_eq!(event.start_at, Some(1500));

    let first = stores.standings.get(&300).expect("standing 300");
    assert_eq!(first.player_id, Some(1));
    assert_eq!(first.placement, 1);
    assert_eq!(first.event_id, 200);
    assert_eq!(first.tournament_id, 100);

    let second = stores.standings.get(&301).expect("standing 301");
    assert_eq!(second.player_id, Some(2), "override should resolve player 2");
    assert_eq!(second.placement, 2);

    let alice = stores.players.get(&1).expect("player 1");
    assert_eq!(alice.name.as_deref(), Some("Alice"));
    assert_eq!(alice.standings, vec![300]);

    let unnamed = stores.players.get(&2).expect("player 2");
    assert_eq!(unnamed.name, None, "no gamerTag resolvable via override");
    assert_eq!(unnamed.standings, vec![301]);
}

#[test]
fn rerunning_the_same_range_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());

    aggregate::run(&paths, &RunOptions::default()).expect("first run");
    let before = store_snapshot(&paths);

    let summary = aggregate::run(&paths, &RunOptions::default()).expect("second run");
    let after = store_snapshot(&paths);

    assert_eq!(before, after, "stores must not change across identical runs");
    assert_eq!(summary.counters.players_added, 0);
    assert_eq!(
        summary.counters.players_updated, 0,
        "re-merged standings must not be appended again"
    );
}

#[test]
fn duplicate_artifacts_never_duplicate_player_standings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());
    fs::write(
        paths.fetched_data().join("page2-response.json"),
        read_fixture("page1_response.json"),
    )
    .expect("write duplicate artifact");

    let summary = aggregate::run(&paths, &RunOptions::default()).expect("run");
    assert_eq!(summary.pages_processed, 2);

    let stores = stores::load_stores(&paths).expect("reload stores");
    assert_eq!(stores.players.get(&1).expect("player 1").standings, vec![300]);
    assert_eq!(stores.players.get(&2).expect("player 2").standings, vec![301]);
}

#[test]
fn start_page_beyond_end_page_fails_before_any_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = StorePaths::new(dir.path().join("data"));

    let opts = RunOptions {
        start_page: 5,
        end_page: Some(2),
        skip_players: false,
    };
    let err = aggregate::run(&paths, &opts).expect_err("precondition should fail");
    assert!(err.to_string().contains("greater than end page"));
    assert!(
        !paths.data_dir().exists(),
        "no files may be created before the precondition check"
    );
}

#[test]
fn start_page_zero_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = StorePaths::new(dir.path().join("data"));

    let opts = RunOptions {
        start_page: 0,
        end_page: None,
        skip_players: false,
    };
    let err = aggregate::run(&paths, &opts).expect_err("precondition should fail");
    assert!(err.to_string().contains("greater than 0"));
    assert!(!paths.data_dir().exists());
}

#[test]
fn skip_players_leaves_player_store_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());

    let opts = RunOptions {
        start_page: 1,
        end_page: None,
        skip_players: true,
    };
    aggregate::run(&paths, &opts).expect("run");

    assert!(
        !paths.players().exists(),
        "players store must not be written with --skipPlayers"
    );

    let standings = stores::load_stores(&paths).expect("reload").standings;
    assert_eq!(
        standings.get(&300).expect("standing 300").player_id,
        Some(1),
        "standings still resolve players when player updates are skipped"
    );
}

#[test]
fn positional_range_limits_which_artifacts_merge() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());
    // A second artifact whose tournament would overwrite the first.
    let renamed = read_fixture("page1_response.json").replace("Tripoint 5", "Tripoint 6");
    fs::write(paths.fetched_data().join("page2-response.json"), renamed)
        .expect("write artifact");

    let opts = RunOptions {
        start_page: 1,
        end_page: Some(1),
        skip_players: false,
    };
    let summary = aggregate::run(&paths, &opts).expect("run");
    assert_eq!(summary.pages_processed, 1);

    let stores = stores::load_stores(&paths).expect("reload");
    assert_eq!(stores.tournaments.get(&100).expect("tournament").name, "Tripoint 5");
}

#[test]
fn later_pages_win_overwrites() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());
    let renamed = read_fixture("page1_response.json").replace("Tripoint 5", "Tripoint 6");
    fs::write(paths.fetched_data().join("page2-response.json"), renamed)
        .expect("write artifact");

    aggregate::run(&paths, &RunOptions::default()).expect("run");

    let stores = stores::load_stores(&paths).expect("reload");
    assert_eq!(stores.tournaments.get(&100).expect("tournament").name, "Tripoint 6");
}

#[test]
fn malformed_artifact_aborts_but_keeps_earlier_flushes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = seed_data_dir(dir.path());
    fs::write(paths.fetched_data().join("page2-response.json"), "{ not json")
        .expect("write broken artifact");

    let err = aggregate::run(&paths, &RunOptions::default()).expect_err("run should abort");
    assert!(err.to_string().contains("page2-response.json"));

    // The page1 flush survives the abort.
    let stores = stores::load_stores(&paths).expect("reload");
    assert!(stores.tournaments.contains_key(&100));
    assert!(stores.standings.contains_key(&300));
}
