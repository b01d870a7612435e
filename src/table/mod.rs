// src/table/mod.rs

pub mod flatten;
pub mod merge;
pub mod parse;
pub mod write;

pub use flatten::{DropOuterLevel, HeaderFlattener};
pub use merge::{merge, CombinedDataset};
pub use parse::parse_fragment;
pub use write::write_csv;

use crate::extract::TableFragment;
use tracing::debug;

/// Header rows, outermost level first.
pub type HeaderStack = Vec<Vec<String>>;

/// A table as read off the page, before the header is flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: HeaderStack,
    /// Body rows followed by footer rows, spans already expanded.
    pub body: Vec<Vec<String>>,
}

/// A table with a single header level. Every row has `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }
}

/// Flatten the header with `flattener` and square up the rows.
///
/// Blank names become `Unnamed: <i>`, repeats become `name.1`, `name.2`, ...
/// Rows wider than the header get positional names for the extra columns;
/// short rows are padded with empty cells.
pub fn normalize(raw: RawTable, flattener: &dyn HeaderFlattener) -> Table {
    let width = raw.body.iter().map(Vec::len).max().unwrap_or(0);
    let mut names = flattener.flatten(&raw.header, width);
    for i in names.len()..width {
        names.push(i.to_string());
    }

    let columns = dedupe(
        names
            .into_iter()
            .enumerate()
            .map(|(i, n)| if n.is_empty() { format!("Unnamed: {}", i) } else { n })
            .collect(),
    );

    let rows = raw
        .body
        .into_iter()
        .map(|mut row| {
            row.resize(columns.len(), String::new());
            row
        })
        .collect();

    Table { columns, rows }
}

/// Parse and normalise every fragment, keeping discovery order.
pub fn normalize_all(fragments: &[TableFragment], flattener: &dyn HeaderFlattener) -> Vec<Table> {
    fragments
        .iter()
        .map(|frag| {
            let raw = parse_fragment(frag);
            let levels = raw.header.len();
            let table = normalize(raw, flattener);
            debug!(
                index = frag.index,
                header_levels = levels,
                columns = table.columns.len(),
                rows = table.rows.len(),
                "normalized table"
            );
            table
        })
        .collect()
}

fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 0;
        while out.contains(&candidate) {
            n += 1;
            candidate = format!("{}.{}", name, n);
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn single_level_header_is_kept() {
        let raw = RawTable {
            header: vec![s(&["Province", "1871"])],
            body: vec![s(&["Ontario", "1620851"])],
        };
        let t = normalize(raw, &DropOuterLevel);
        assert_eq!(t.columns, s(&["Province", "1871"]));
        assert_eq!(t.get(0, "1871"), Some("1620851"));
    }

    #[test]
    fn two_level_header_keeps_inner_names() {
        let raw = RawTable {
            header: vec![s(&["Name", "Census", "Census"]), s(&["Name", "1871", "1881"])],
            body: vec![s(&["Quebec", "1191516", "1359027"])],
        };
        let t = normalize(raw, &DropOuterLevel);
        assert_eq!(t.columns, s(&["Name", "1871", "1881"]));
    }

    #[test]
    fn duplicates_and_blanks_are_renamed() {
        let raw = RawTable {
            header: vec![s(&["Year", "", "Year", "Year"])],
            body: vec![],
        };
        let t = normalize(raw, &DropOuterLevel);
        assert_eq!(t.columns, s(&["Year", "Unnamed: 1", "Year.1", "Year.2"]));
    }

    #[test]
    fn rows_are_squared_to_the_header() {
        let raw = RawTable {
            header: vec![s(&["A", "B"])],
            body: vec![s(&["1"]), s(&["1", "2", "3"])],
        };
        let t = normalize(raw, &DropOuterLevel);
        assert_eq!(t.columns, s(&["A", "B", "2"]));
        assert_eq!(t.rows, vec![s(&["1", "", ""]), s(&["1", "2", "3"])]);
    }

    #[test]
    fn headerless_table_gets_positional_names() {
        let raw = RawTable {
            header: vec![],
            body: vec![s(&["x", "y"])],
        };
        let t = normalize(raw, &DropOuterLevel);
        assert_eq!(t.columns, s(&["0", "1"]));
        assert_eq!(t.row_count(), 1);
    }

    #[test]
    fn normalize_all_keeps_fragment_order() {
        let frags = vec![
            TableFragment::new(0, "<table><tr><th>First</th></tr><tr><td>1</td></tr></table>"),
            TableFragment::new(1, "<table><tr><th>Second</th></tr><tr><td>2</td></tr></table>"),
        ];
        let tables = normalize_all(&frags, &DropOuterLevel);
        assert_eq!(tables[0].columns, s(&["First"]));
        assert_eq!(tables[1].columns, s(&["Second"]));
    }
}
