//! Page fetch loop: one query per page number, persisting each non-empty
//! response before the next request so aggregation can replay offline.

use anyhow::{Context, Result, bail};

use crate::http_client::http_client;
use crate::pages;
use crate::startgg::{self, PageData, QueryVariables};
use crate::stores::{self, StorePaths};

pub const DEFAULT_PER_PAGE: u32 = 4;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub start_page: u64,
    pub end_page: Option<u64>,
    pub per_page: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Default)]
pub struct FetchSummary {
    pub pages_saved: usize,
    /// `pageInfo.totalPages` from the most recent successful response.
    pub total_pages: Option<u64>,
    /// Why the loop stopped early, when it did not run to its natural end.
    pub errors: Vec<String>,
}

/// Fetch pages `start_page..` until an empty page, the end-page limit, or a
/// query error. Each non-empty response is persisted before the next request,
/// so partial progress is never lost.
pub fn run(paths: &StorePaths, token: &str, opts: &FetchOptions) -> Result<FetchSummary> {
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

    let client = http_client()?;
    let fetched_dir = paths.fetched_data();
    std::fs::create_dir_all(&fetched_dir)
        .with_context(|| format!("create {}", fetched_dir.display()))?;

    let mut summary = FetchSummary::default();
    let mut page = opts.start_page;
    loop {
        if let Some(end_page) = opts.end_page
            && page > end_page
        {
            println!("Stopping because current page is {page} and end page limit is {end_page}");
            break;
        }

        println!("Fetching page {page} data from start.gg API...");
        let variables = QueryVariables::for_page(page, opts.per_page);
        let envelope = match startgg::fetch_tournaments_page(client, token, &variables) {
            Ok(envelope) => envelope,
            Err(err) => {
                summary.errors.push(format!("page {page}: {err:#}"));
                break;
            }
        };
        if !envelope.errors.is_empty() {
            for error in &envelope.errors {
                summary
                    .errors
                    .push(format!("page {page}: {}", error.describe()));
            }
            break;
        }
        let Some(data) = envelope.data else {
            summary
                .errors
                .push(format!("page {page}: response carried no data"));
            break;
        };
        let parsed: PageData = match serde_json::from_value(data.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                summary
                    .errors
                    .push(format!("page {page}: unexpected response shape: {err}"));
                break;
            }
        };

        if parsed.tournaments.nodes.is_empty() {
            println!("No results for page {page}");
            break;
        }

        // Persist before the next request.
        let artifact = fetched_dir.join(pages::page_artifact_name(page));
        let json = serde_json::to_string_pretty(&data)
            .with_context(|| format!("serialize page {page} response"))?;
        stores::write_atomic(&artifact, &json)?;

        if let Some(total_pages) = parsed
            .tournaments
            .page_info
            .as_ref()
            .and_then(|info| info.total_pages)
        {
            summary.total_pages = Some(total_pages);
            println!(
                "Response saved to {} (page {page} of {total_pages}). Continuing to fetch data.",
                artifact.display()
            );
        } else {
            println!(
                "Response saved to {}. Continuing to fetch data.",
                artifact.display()
            );
        }

        summary.pages_saved += 1;
        page += 1;
    }

    for error in &summary.errors {
        eprintln!("Error fetching data: {error}");
    }
    Ok(summary)
}
