// src/table/merge.rs

use std::collections::HashMap;

use super::Table;

/// Row-wise union of several tables. `None` marks a column the source
/// table did not have.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedDataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl CombinedDataset {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Concatenate `tables` by row, aligning cells by column name.
///
/// Columns keep the order in which they were first seen. Zero tables give
/// an empty dataset.
pub fn merge(tables: &[Table]) -> CombinedDataset {
    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for table in tables {
        for name in &table.columns {
            if !index.contains_key(name) {
                index.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let total = tables.iter().map(Table::row_count).sum();
    let mut rows = Vec::with_capacity(total);
    for table in tables {
        let slots: Vec<usize> = table.columns.iter().map(|c| index[c]).collect();
        for row in &table.rows {
            let mut out = vec![None; columns.len()];
            for (cell, &slot) in row.iter().zip(&slots) {
                out[slot] = Some(cell.clone());
            }
            rows.push(out);
        }
    }

    CombinedDataset { columns, rows }
}
