//! Print podium rankings computed from the aggregated stores.
//!
//! Usage: rankings_report [--dataDir=<path>] [--top=<n>]

use anyhow::Result;

use tourney_results::args;
use tourney_results::rankings::compute_player_rankings;
use tourney_results::stores::{self, StorePaths};

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let paths = StorePaths::new(
        args::string_arg(&argv, "dataDir").unwrap_or_else(|| "./data".to_string()),
    );
    let top = args::u64_arg(&argv, "top").map(|n| n as usize);

    let standings = stores::load_json_map(&paths.standings())?;
    let players = stores::load_json_map(&paths.players())?;

    let rankings = compute_player_rankings(&standings, &players);
    let shown = top.unwrap_or(rankings.len()).min(rankings.len());

    println!(
        "{:>3}  {:<24} {:>6} {:>4} {:>4} {:>4}",
        "#", "Player", "Top 3", "1st", "2nd", "3rd"
    );
    for (idx, entry) in rankings.iter().take(shown).enumerate() {
        println!(
            "{:>3}  {:<24} {:>6} {:>4} {:>4} {:>4}",
            idx + 1,
            entry.display_name(),
            entry.total_top3,
            entry.first,
            entry.second,
            entry.third
        );
    }
    if rankings.is_empty() {
        println!("No podium finishes recorded yet.");
    }
    Ok(())
}
