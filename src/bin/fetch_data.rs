//! Fetch tournament pages from the start.gg API into the fetched-data
//! directory.
//!
//! Usage: fetch_data [--perPage=<n>] [--startPage=<n>] [--endPage=<n>] [--dataDir=<path>]

use anyhow::{Context, Result};

use tourney_results::args;
use tourney_results::fetch::{self, DEFAULT_PER_PAGE, FetchOptions};
use tourney_results::stores::StorePaths;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let token = std::env::var("START_GG_API_KEY")
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .context("START_GG_API_KEY not found in environment or .env file")?;

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let opts = FetchOptions {
        start_page: args::u64_arg(&argv, "startPage").unwrap_or(1),
        end_page: args::u64_arg(&argv, "endPage"),
        per_page: args::u64_arg(&argv, "perPage")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_PER_PAGE),
    };
    let paths = StorePaths::new(
        args::string_arg(&argv, "dataDir").unwrap_or_else(|| "./data".to_string()),
    );

    let summary = fetch::run(&paths, &token, &opts)?;

    println!("Fetch complete");
    println!("Pages saved: {}", summary.pages_saved);
    if let Some(total_pages) = summary.total_pages {
        println!("Total pages reported by the API: {total_pages}");
    }
    if !summary.errors.is_empty() {
        println!("Stopped on error; already-fetched pages were kept.");
    }
    Ok(())
}
