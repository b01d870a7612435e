// src/table/flatten.rs

/// Turns a stack of header rows (outermost first) into one header row.
///
/// `width` is the widest body row, used when there is no header at all.
pub trait HeaderFlattener {
    fn flatten(&self, header: &[Vec<String>], width: usize) -> Vec<String>;
}

/// Drop the outermost level of a multi-level header.
///
/// One level is returned untouched. With three or more levels the innermost
/// of what remains is used, so the result is always a single row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropOuterLevel;

impl HeaderFlattener for DropOuterLevel {
    fn flatten(&self, header: &[Vec<String>], width: usize) -> Vec<String> {
        match header {
            [] => (0..width).map(|i| i.to_string()).collect(),
            [only] => only.clone(),
            [_outer, rest @ ..] => rest.last().cloned().unwrap_or_default(),
        }
    }
}
