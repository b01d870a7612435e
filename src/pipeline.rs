// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{io::Write, path::PathBuf};
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::{
    config::Config,
    extract::Document,
    fetch::{fetch_page, FetchError},
    links::{self, LinkResolver},
    table::{self, DropOuterLevel},
};

/// Counts from a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub tables: usize,
    pub rows: usize,
    pub columns: usize,
    pub headings: Vec<String>,
    pub links: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub output_path: PathBuf,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The page itself could not be fetched; nothing else was done.
    PageUnavailable(FetchError),
}

/// Fetch the page, write the combined tables, print headings and links,
/// then download every linked page. Console lines go to `out`.
#[instrument(level = "info", skip_all, fields(page = %config.page_url))]
pub async fn run<W: Write>(config: &Config, client: &Client, out: &mut W) -> Result<RunOutcome> {
    let start = Instant::now();

    // ─── 1) fetch the page ───────────────────────────────────────────
    let page = match fetch_page(client, &config.page_url).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "page fetch failed; aborting");
            writeln!(out, "Failed to retrieve the webpage.")?;
            return Ok(RunOutcome::PageUnavailable(e));
        }
    };
    info!(bytes = page.body.len(), "page fetched");

    // ─── 2) locate tables ────────────────────────────────────────────
    let doc = Document::parse(&page.body);
    let fragments = doc.tables(&config.table_class);

    // ─── 3) normalise, merge, write ──────────────────────────────────
    let tables = table::normalize_all(&fragments, &DropOuterLevel);
    let combined = table::merge(&tables);
    table::write_csv(&combined, &config.output_path)
        .with_context(|| format!("saving {}", config.output_path.display()))?;
    if fragments.is_empty() {
        warn!(class = %config.table_class, "no tables matched");
        writeln!(
            out,
            "No tables with class '{}' found; wrote empty '{}'.",
            config.table_class,
            config.output_path.display()
        )?;
    } else {
        writeln!(
            out,
            "Combined table saved as '{}'.",
            config.output_path.display()
        )?;
    }

    // ─── 4) headings ─────────────────────────────────────────────────
    let headings = doc.headings(&config.heading_tag)?;
    writeln!(out, "H2 Elements: {:?}", headings)?;

    // ─── 5) links ────────────────────────────────────────────────────
    let hrefs = links::collect_links(&fragments);
    links::print_links(out, &hrefs)?;

    let resolver = LinkResolver::new(&config.base_url, config.link_resolution)?;
    let urls: Vec<String> = hrefs.iter().map(|h| resolver.resolve(h)).collect();
    let walk = links::walk(client, urls, config.link_concurrency, out).await?;

    let summary = RunSummary {
        tables: tables.len(),
        rows: combined.row_count(),
        columns: combined.columns.len(),
        headings,
        links: hrefs.len(),
        downloaded: walk.downloaded(),
        failed: walk.failed(),
        output_path: config.output_path.clone(),
    };
    info!(
        tables = summary.tables,
        rows = summary.rows,
        links = summary.links,
        downloaded = summary.downloaded,
        failed = summary.failed,
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunOutcome::Completed(summary))
}
