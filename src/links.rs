// src/links.rs

use anyhow::{Context, Result};
use futures::{stream, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::Selector;
use std::{collections::HashMap, io::Write};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::LinkResolution;
use crate::extract::TableFragment;
use crate::fetch::fetch_page;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("selector should parse"));

/// Every `href` inside the fragments: fragment order, then document order.
/// Duplicates are kept.
pub fn collect_links(fragments: &[TableFragment]) -> Vec<String> {
    let mut links = Vec::new();
    for frag in fragments {
        let doc = frag.parse();
        let before = links.len();
        links.extend(
            doc.select(&ANCHOR)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string),
        );
        debug!(index = frag.index, count = links.len() - before, "collected links");
    }
    links
}

pub fn print_links<W: Write>(out: &mut W, links: &[String]) -> Result<()> {
    writeln!(out, "All the hyperlinks embedded within the tables:")?;
    for link in links {
        writeln!(out, "{}", link)?;
    }
    Ok(())
}

/// Turns table hrefs into absolute URLs.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base: String,
    mode: LinkResolution,
    base_url: Url,
}

impl LinkResolver {
    pub fn new(base: &str, mode: LinkResolution) -> Result<Self> {
        let base_url = Url::parse(base).with_context(|| format!("parsing base URL {}", base))?;
        Ok(Self {
            base: base.to_string(),
            mode,
            base_url,
        })
    }

    /// In `Concat` mode this is plain `base + href`: an href that does not
    /// start with `/` or that is protocol-relative yields a malformed URL.
    pub fn resolve(&self, href: &str) -> String {
        match self.mode {
            LinkResolution::Concat => format!("{}{}", self.base, href),
            LinkResolution::Join => match self.base_url.join(href) {
                Ok(u) => u.to_string(),
                Err(e) => {
                    warn!(href, error = %e, "cannot join href; concatenating");
                    format!("{}{}", self.base, href)
                }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Downloaded { bytes: usize },
    Failed { status: Option<u16>, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub url: String,
    pub outcome: LinkOutcome,
}

/// Result of a traversal. `pages` holds each downloaded body keyed by URL.
#[derive(Debug, Default)]
pub struct LinkWalk {
    pub pages: HashMap<String, Vec<u8>>,
    pub reports: Vec<LinkReport>,
}

impl LinkWalk {
    pub fn downloaded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, LinkOutcome::Downloaded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.downloaded()
    }
}

/// Fetch every URL, writing one line per link to `out`.
///
/// Up to `concurrency` requests are in flight, but results are reported in
/// the order of `urls`. A failed link is reported and skipped.
pub async fn walk<W: Write>(
    client: &Client,
    urls: Vec<String>,
    concurrency: usize,
    out: &mut W,
) -> Result<LinkWalk> {
    info!(links = urls.len(), concurrency, "walking links");
    let mut walk = LinkWalk::default();

    let mut results = stream::iter(urls)
        .map(|url| async move {
            let res = fetch_page(client, &url).await;
            (url, res)
        })
        .buffered(concurrency.max(1));

    while let Some((url, res)) = results.next().await {
        match res {
            Ok(page) => {
                writeln!(out, "Downloaded content: {}", url)?;
                info!(%url, bytes = page.body.len(), "downloaded");
                walk.reports.push(LinkReport {
                    url: url.clone(),
                    outcome: LinkOutcome::Downloaded {
                        bytes: page.body.len(),
                    },
                });
                walk.pages.insert(url, page.body);
            }
            Err(e) => {
                match e.status() {
                    Some(code) => writeln!(out, "Failed to download content, Status code: {}", code)?,
                    None => writeln!(out, "Failed to download content: {}", e)?,
                }
                warn!(%url, error = %e, "link fetch failed");
                walk.reports.push(LinkReport {
                    url,
                    outcome: LinkOutcome::Failed {
                        status: e.status(),
                        reason: e.to_string(),
                    },
                });
            }
        }
    }

    info!(
        downloaded = walk.downloaded(),
        failed = walk.failed(),
        "link walk finished"
    );
    Ok(walk)
}
