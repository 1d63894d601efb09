//! Aggregate fetched page artifacts into the canonical JSON stores.
//!
//! Usage: aggregate_data [--startPage=<n>] [--endPage=<n>] [--skipPlayers] [--dataDir=<path>]

use anyhow::Result;

use tourney_results::aggregate::{self, RunOptions};
use tourney_results::args;
use tourney_results::stores::StorePaths;

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let opts = RunOptions {
        start_page: args::u64_arg(&argv, "startPage").unwrap_or(1),
        end_page: args::u64_arg(&argv, "endPage"),
        skip_players: args::bool_arg(&argv, "skipPlayers"),
    };
    let paths = StorePaths::new(
        args::string_arg(&argv, "dataDir").unwrap_or_else(|| "./data".to_string()),
    );

    let summary = aggregate::run(&paths, &opts)?;

    println!("Aggregation complete");
    println!("Pages processed: {}", summary.pages_processed);
    println!("Tournaments added: {}", summary.counters.tournaments_added);
    println!("Events added: {}", summary.counters.events_added);
    println!(
        "Standings-bearing events: {}",
        summary.counters.standings_events
    );
    if opts.skip_players {
        println!("Player updates skipped");
    } else {
        println!(
            "Players added: {} updated: {}",
            summary.counters.players_added, summary.counters.players_updated
        );
    }
    Ok(())
}
