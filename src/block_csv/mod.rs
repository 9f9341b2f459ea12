// src/block_csv/mod.rs
//! Reader for semicolon-delimited files with backslash escapes and named blocks.
//!
//! ```text
//! # rows of the default block come first
//! x;1
//! #! block B
//! y;2\;3
//! ```

pub mod codec;
pub mod row;
pub mod scan;
pub mod writer;

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};
use tracing::{debug, instrument};

use codec::{decode_line, trim_blank};
use row::{Row, MIN_DECODED_WIDTH};
use scan::{classify, BlockScanner};

/// Accept/reject callback applied to every candidate row.
pub trait RowFilter {
    fn accept(&self, row: &Row) -> bool;
}

impl<F> RowFilter for F
where
    F: Fn(&Row) -> bool,
{
    fn accept(&self, row: &Row) -> bool {
        self(row)
    }
}

/// Per-parse options: which block to read and which rows to keep.
#[derive(Default)]
pub struct CsvReader<'f> {
    block: Option<String>,
    filter: Option<Box<dyn RowFilter + 'f>>,
}

impl<'f> CsvReader<'f> {
    /// Reader for the default block, keeping every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the block named `name` instead of the default block.
    pub fn block(mut self, name: impl Into<String>) -> Self {
        self.block = Some(name.into());
        self
    }

    /// Keep only rows for which `filter` returns `true`.
    pub fn filter<F: RowFilter + 'f>(mut self, filter: F) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Parse the file at `path`. A file that does not exist reads as empty.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<BlockCsvFile> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no such file, treating as empty");
                return Ok(BlockCsvFile::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("opening {}", path.display()));
            }
        };
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.read_from(file, &label)
    }

    /// Parse everything `reader` yields. `location` names the source in row
    /// locations (`line <n>, <location>`). The reader is consumed and dropped
    /// on every return path.
    #[instrument(level = "debug", skip(self, reader), fields(block = ?self.block))]
    pub fn read_from<R: Read>(&self, mut reader: R, location: &str) -> Result<BlockCsvFile> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .with_context(|| format!("reading block CSV {}", location))?;
        drop(reader);
        let text = String::from_utf8_lossy(&buf);

        let mut scanner = BlockScanner::new(self.block.as_deref());
        let mut rows = Vec::new();
        let mut rejected = 0usize;

        for (idx, line) in physical_lines(&text).enumerate() {
            if !scanner.advance(classify(line)) {
                if scanner.is_done() {
                    break;
                }
                continue;
            }
            let row = materialize(format!("line {}, {}", idx + 1, location), line);
            match &self.filter {
                Some(filter) if !filter.accept(&row) => rejected += 1,
                _ => rows.push(row),
            }
        }

        debug!(
            bytes = buf.len(),
            kept = rows.len(),
            rejected,
            mode = ?scanner.mode(),
            "parsed {}",
            location
        );
        Ok(BlockCsvFile { rows })
    }
}

/// Decode a data line into a row: trim every cell, then pad to
/// [`MIN_DECODED_WIDTH`] before the row adds its own padding.
fn materialize(location: String, line: &str) -> Row {
    let mut cells: Vec<String> = decode_line(line)
        .iter()
        .map(|c| trim_blank(c).to_string())
        .collect();
    if cells.len() < MIN_DECODED_WIDTH {
        cells.resize(MIN_DECODED_WIDTH, String::new());
    }
    Row::new(location, cells)
}

/// Split on `\n`, `\r\n` or a lone `\r`. A terminator at the very end does
/// not start another line.
fn physical_lines(text: &str) -> PhysicalLines<'_> {
    PhysicalLines { rest: text }
}

struct PhysicalLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let bytes = self.rest.as_bytes();
        match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            None => Some(std::mem::take(&mut self.rest)),
            Some(end) => {
                let line = &self.rest[..end];
                let skip = if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                self.rest = &self.rest[end + skip..];
                Some(line)
            }
        }
    }
}

/// The rows of one block, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockCsvFile {
    rows: Vec<Row>,
}

impl BlockCsvFile {
    /// Default block of the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        CsvReader::new().read_path(path)
    }

    /// Block `name` of the file at `path`.
    pub fn open_block<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        CsvReader::new().block(name).read_path(path)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Does any row match `pattern`? `None` entries match anything; other
    /// entries must equal the cell at the same position exactly.
    pub fn contains(&self, pattern: &[Option<&str>]) -> bool {
        self.rows.iter().any(|row| row.matches(pattern))
    }
}

impl<'a> IntoIterator for &'a BlockCsvFile {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
