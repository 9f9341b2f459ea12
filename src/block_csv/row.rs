// src/block_csv/row.rs
use serde::Serialize;
use std::fmt;

use super::codec::{encode_cell, is_blank};

/// Blank cells appended to every row on construction.
pub const ROW_PADDING: usize = 10;

/// Width the reader pads decoded cells to before building a row.
pub const MIN_DECODED_WIDTH: usize = 100;

/// Minimum number of cells in any row produced by the reader.
pub const MIN_ROW_WIDTH: usize = MIN_DECODED_WIDTH + ROW_PADDING;

/// One decoded data line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Where the row came from, e.g. `line 12, orders.csv`. Diagnostics only.
    location: String,
    cells: Vec<String>,
    significant_length: usize,
}

impl Row {
    /// Build a row from `cells`, recording the 1-based position of the last
    /// non-blank cell and then appending [`ROW_PADDING`] empty cells.
    pub fn new(location: impl Into<String>, cells: Vec<String>) -> Self {
        let significant_length = last_non_blank(&cells);
        let mut cells = cells;
        cells.extend(std::iter::repeat(String::new()).take(ROW_PADDING));
        Self {
            location: location.into(),
            cells,
            significant_length,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// All cells, padding included.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at `index`, or `""` past the end.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    /// Number of cells up to and including the last non-blank one, as supplied
    /// to [`Row::new`]. Zero if every supplied cell is blank.
    pub fn significant_length(&self) -> usize {
        self.significant_length
    }

    /// `true` if every non-`None` entry of `pattern` equals the cell at the
    /// same position. Cells past the end compare as `""`.
    pub fn matches(&self, pattern: &[Option<&str>]) -> bool {
        pattern.iter().enumerate().all(|(i, want)| match want {
            Some(want) => *want == self.cell(i),
            None => true,
        })
    }
}

fn last_non_blank(cells: &[String]) -> usize {
    cells
        .iter()
        .rposition(|c| !is_blank(c))
        .map_or(0, |i| i + 1)
}

/// Diagnostic rendering: encoded cells, each followed by `"; "`.
///
/// The cut-off is recomputed over the padded cells and used as an inclusive
/// index, so one cell past the last non-blank one is always printed.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cells.is_empty() {
            return Ok(());
        }
        let last = last_non_blank(&self.cells).min(self.cells.len() - 1);
        for cell in &self.cells[..=last] {
            write!(f, "{}; ", encode_cell(cell))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_significant_length() {
        let row = Row::new("line 1, t.csv", cells(&["a", "", "b", "", ""]));
        assert_eq!(row.significant_length(), 3);
        assert_eq!(row.cells().len(), 5 + ROW_PADDING);

        let blank = Row::new("line 2, t.csv", cells(&["", "  ", "\t"]));
        assert_eq!(blank.significant_length(), 0);

        let empty = Row::new("line 3, t.csv", Vec::new());
        assert_eq!(empty.significant_length(), 0);
        assert_eq!(empty.cells().len(), ROW_PADDING);
    }

    #[test]
    fn test_cell_past_end_is_empty() {
        let row = Row::new("here", cells(&["x"]));
        assert_eq!(row.cell(0), "x");
        assert_eq!(row.cell(ROW_PADDING), "");
        assert_eq!(row.cell(10_000), "");
        assert_eq!(row.location(), "here");
    }

    #[test]
    fn test_display_prints_one_cell_past_last_non_blank() {
        let row = Row::new("l", cells(&["a", "b;c", "", "d"]));
        assert_eq!(row.to_string(), r"a; b\;c; ; d; ; ");

        let blank = Row::new("l", cells(&["", ""]));
        assert_eq!(blank.to_string(), "; ");
    }

    #[test]
    fn test_display_recomputes_cut_off() {
        // "\n" trims to blank, so it only shows up as the extra trailing cell.
        let row = Row::new("l", cells(&["a", "\n"]));
        assert_eq!(row.significant_length(), 1);
        assert_eq!(row.to_string(), r"a; \n; ");
    }

    #[test]
    fn test_matches_wildcards() {
        let row = Row::new("l", cells(&["a", "b", "c"]));
        assert!(row.matches(&[None, Some("b"), None]));
        assert!(row.matches(&[]));
        assert!(!row.matches(&[Some("a"), Some("b"), Some("z")]));
        assert!(!row.matches(&[Some(" a")]));
        assert!(row.matches(&[None, None, None, Some("")]));
    }

    #[test]
    fn test_serializes_fields() {
        let row = Row::new("line 4, x.csv", cells(&["k", ""]));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["location"], "line 4, x.csv");
        assert_eq!(json["significant_length"], 1);
        assert_eq!(json["cells"].as_array().unwrap().len(), 2 + ROW_PADDING);
    }
}
