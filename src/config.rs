// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_PAGE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_Canadian_provinces_and_territories_by_historical_population";
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
pub const DEFAULT_OUTPUT: &str = "combined_population_data.csv";
/// Looked up in the working directory by the binary.
pub const CONFIG_FILE: &str = "wikitables.yaml";

/// How an `href` found in a table becomes a fetchable URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkResolution {
    /// `base_url + href`, verbatim.
    #[default]
    Concat,
    /// RFC 3986 reference resolution against `base_url`.
    Join,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub page_url: String,
    pub base_url: String,
    pub table_class: String,
    pub heading_tag: String,
    pub output_path: PathBuf,
    pub link_resolution: LinkResolution,
    /// Link fetches in flight at once; 1 means strictly one after another.
    pub link_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            table_class: "wikitable".to_string(),
            heading_tag: "h2".to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            link_resolution: LinkResolution::Concat,
            link_concurrency: 1,
        }
    }
}

impl Config {
    /// Read `path` if it exists, otherwise fall back to the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let cfg = Self::from_yaml(&text).with_context(|| format!("loading {:?}", path))?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserialises to unit, not to a struct.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(text).context("parsing YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.page_url).with_context(|| format!("page_url {:?}", self.page_url))?;
        Url::parse(&self.base_url).with_context(|| format!("base_url {:?}", self.base_url))?;
        if self.table_class.is_empty() || self.table_class.chars().any(char::is_whitespace) {
            bail!("table_class must be a single class name, got {:?}", self.table_class);
        }
        if self.heading_tag.trim().is_empty() {
            bail!("heading_tag must not be empty");
        }
        if self.link_concurrency == 0 {
            bail!("link_concurrency must be at least 1");
        }
        Ok(())
    }
}
