// src/table/parse.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use tracing::{trace, warn};

use super::RawTable;
use crate::extract::TableFragment;

/// Line breaks with their surrounding whitespace, or any other run of two or more.
static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[\r\n]+\s*|\s{2,}").expect("whitespace pattern should compile")
});

// Same ceilings browsers apply.
const MAX_COLSPAN: usize = 1_000;
const MAX_ROWSPAN: usize = 65_534;

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    is_th: bool,
    colspan: usize,
    rowspan: usize,
}

/// Parse one fragment into header levels and body rows.
///
/// A fragment without any `<table>` yields an empty table.
pub fn parse_fragment(frag: &TableFragment) -> RawTable {
    let doc = frag.parse();
    let sel = Selector::parse("table").expect("selector should parse");
    match doc.select(&sel).next() {
        Some(table) => parse_table(table),
        None => {
            warn!(index = frag.index, "fragment contains no table element");
            RawTable::default()
        }
    }
}

/// Read the rows belonging to `table` itself; rows of nested tables are ignored.
///
/// Rows under `<thead>` form the header. Without a `<thead>`, leading body
/// rows made only of `<th>` cells are promoted to the header instead.
/// Each section has its spans expanded on its own.
pub fn parse_table(table: ElementRef) -> RawTable {
    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();

    for child in visible_children(table) {
        match child.value().name() {
            "thead" => head.extend(rows_of(child)),
            "tbody" => body.extend(rows_of(child)),
            "tfoot" => foot.extend(rows_of(child)),
            "tr" => body.push(cells_of(child)),
            _ => {}
        }
    }

    if head.is_empty() {
        let promoted = body
            .iter()
            .take_while(|row: &&Vec<Cell>| !row.is_empty() && row.iter().all(|c| c.is_th))
            .count();
        head = body.drain(..promoted).collect();
    }
    trace!(head = head.len(), body = body.len(), foot = foot.len(), "table sections");

    let header = expand_spans(&head)
        .into_iter()
        .filter(|level| !level.is_empty())
        .collect();
    let mut rows = expand_spans(&body);
    rows.extend(expand_spans(&foot));
    rows.retain(|r| !r.is_empty());

    RawTable { header, body: rows }
}

fn visible_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| !is_hidden(child))
}

fn rows_of(section: ElementRef) -> Vec<Vec<Cell>> {
    visible_children(section)
        .filter(|el| el.value().name() == "tr")
        .map(cells_of)
        .collect()
}

fn cells_of(tr: ElementRef) -> Vec<Cell> {
    visible_children(tr)
        .filter_map(|el| {
            let is_th = match el.value().name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(Cell {
                text: cell_text(el),
                is_th,
                colspan: span(&el, "colspan", MAX_COLSPAN),
                rowspan: span(&el, "rowspan", MAX_ROWSPAN),
            })
        })
        .collect()
}

fn span(el: &ElementRef, attr: &str, max: usize) -> usize {
    el.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(max)
}

fn is_hidden(el: &ElementRef) -> bool {
    el.value().attr("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.to_ascii_lowercase().contains("display:none")
    })
}

/// Visible text of a cell, whitespace-collapsed and trimmed.
fn cell_text(el: ElementRef) -> String {
    let mut raw = String::new();
    push_visible_text(el, &mut raw);
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

fn push_visible_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !is_hidden(&child_el) {
                        push_visible_text(child_el, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Copy `colspan`/`rowspan` cells into every grid position they cover.
///
/// Cells still spanning downwards after the last row produce extra rows.
fn expand_spans(rows: &[Vec<Cell>]) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(rows.len());
    // (origin column, text, rows still to fill)
    let mut pending: Vec<(usize, String, usize)> = Vec::new();

    for row in rows {
        let mut texts: Vec<String> = Vec::new();
        let mut next = Vec::new();
        let mut carried = pending.into_iter().peekable();

        for cell in row {
            while let Some((col, text, left)) = carried.next_if(|(col, _, _)| *col <= texts.len()) {
                if left > 1 {
                    next.push((col, text.clone(), left - 1));
                }
                texts.push(text);
            }
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    next.push((texts.len(), cell.text.clone(), cell.rowspan - 1));
                }
                texts.push(cell.text.clone());
            }
        }
        for (col, text, left) in carried {
            if left > 1 {
                next.push((col, text.clone(), left - 1));
            }
            texts.push(text);
        }

        out.push(texts);
        pending = next;
    }

    while !pending.is_empty() {
        let mut texts = Vec::new();
        let mut next = Vec::new();
        for (col, text, left) in pending {
            if left > 1 {
                next.push((col, text.clone(), left - 1));
            }
            texts.push(text);
        }
        out.push(texts);
        pending = next;
    }

    out
}
