// src/extract.rs

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Raw markup of one matched `<table>`, detached from the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFragment {
    /// Position among the matched tables, in document order.
    pub index: usize,
    pub html: String,
}

impl TableFragment {
    pub fn new(index: usize, html: impl Into<String>) -> Self {
        Self {
            index,
            html: html.into(),
        }
    }

    /// Re-parse the fragment; the table is the first `table` element of the result.
    pub fn parse(&self) -> Html {
        Html::parse_fragment(&self.html)
    }
}

/// A parsed page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        Self {
            html: Html::parse_document(&text),
        }
    }

    /// All tables whose class list contains `class`, in document order.
    /// Tables nested inside other matches are returned too.
    pub fn tables(&self, class: &str) -> Vec<TableFragment> {
        let sel = Selector::parse("table").expect("selector should parse");
        let tables: Vec<TableFragment> = self
            .html
            .select(&sel)
            .filter(|el| has_class(el, class))
            .enumerate()
            .map(|(i, el)| {
                trace!(index = i, "matched table");
                TableFragment::new(i, el.html())
            })
            .collect();
        debug!(class, count = tables.len(), "located tables");
        tables
    }

    /// Trimmed text of every element matching `tag` (normally `h2`).
    pub fn headings(&self, tag: &str) -> Result<Vec<String>> {
        let sel =
            Selector::parse(tag).map_err(|e| anyhow!("invalid heading selector {:?}: {:?}", tag, e))?;
        Ok(self
            .html
            .select(&sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect())
    }
}

fn has_class(el: &ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<h2> Contents </h2>
<table class="wikitable sortable"><tr><th>A</th></tr><tr><td>1</td></tr></table>
<table class="infobox"><tr><td>skip</td></tr></table>
<h2>
  Population
</h2>
<table class="wikitable"><tr><th>B</th></tr><tr><td>2</td></tr></table>
<table class="wikitablex"><tr><td>no</td></tr></table>
</body></html>"#;

    #[test]
    fn selects_tables_by_class_token_in_order() {
        let doc = Document::parse(PAGE.as_bytes());
        let tables = doc.tables("wikitable");
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].index, 0);
        assert!(tables[0].html.contains("<th>A</th>"));
        assert_eq!(tables[1].index, 1);
        assert!(tables[1].html.contains("<th>B</th>"));
    }

    #[test]
    fn no_matching_tables_is_empty_not_error() {
        let doc = Document::parse(b"<html><body><p>nothing</p></body></html>");
        assert!(doc.tables("wikitable").is_empty());
    }

    #[test]
    fn nested_matches_are_included() {
        let html = r#"<table class="wikitable"><tr><td>
            <table class="wikitable"><tr><td>inner</td></tr></table>
        </td></tr></table>"#;
        let doc = Document::parse(html.as_bytes());
        assert_eq!(doc.tables("wikitable").len(), 2);
    }

    #[test]
    fn headings_are_trimmed_in_document_order() {
        let doc = Document::parse(PAGE.as_bytes());
        assert_eq!(doc.headings("h2").unwrap(), vec!["Contents", "Population"]);
    }

    #[test]
    fn invalid_heading_selector_is_an_error() {
        let doc = Document::parse(PAGE.as_bytes());
        assert!(doc.headings("h2[").is_err());
    }

    #[test]
    fn fragment_reparses_to_a_table() {
        let doc = Document::parse(PAGE.as_bytes());
        let frag = &doc.tables("wikitable")[0];
        let html = frag.parse();
        let sel = Selector::parse("td").unwrap();
        let cells: Vec<String> = html.select(&sel).map(|c| c.inner_html()).collect();
        assert_eq!(cells, vec!["1"]);
    }
}
