// src/block_csv/writer.rs
use anyhow::{ensure, Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::debug;

use super::{
    codec::{encode_line, trim_blank},
    scan::BLOCK_INDICATOR,
};

/// Writes files in the layout `CsvReader` expects: an optional default block
/// followed by `#! block <name>` sections.
///
/// The reader trims cells and skips lines that are entirely blank, so such
/// whitespace does not survive a round trip.
pub struct BlockCsvWriter<W: Write> {
    inner: W,
    rows_written: usize,
}

impl BlockCsvWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> BlockCsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            rows_written: 0,
        }
    }

    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        ensure!(
            !has_line_break(text),
            "comment may not contain a line break: {:?}",
            text
        );
        writeln!(self.inner, "# {}", text).context("writing comment")?;
        Ok(())
    }

    /// Start block `name`; following rows belong to it.
    pub fn begin_block(&mut self, name: &str) -> Result<()> {
        ensure!(
            !name.is_empty() && trim_blank(name) == name && !has_line_break(name),
            "invalid block name {:?}",
            name
        );
        writeln!(self.inner, "{}{}", BLOCK_INDICATOR, name)
            .with_context(|| format!("writing block marker {}", name))?;
        debug!(block = name, "started block");
        Ok(())
    }

    /// Write one data line. A leading `#` is escaped so the line is not read
    /// back as a comment.
    pub fn write_row<I, S>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = encode_line(cells);
        let lead = line.len() - line.trim_start_matches(|c: char| c <= ' ').len();
        if line[lead..].starts_with('#') {
            line.insert(lead, '\\');
        }
        writeln!(self.inner, "{}", line).context("writing row")?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush().context("flushing block CSV")?;
        Ok(self.inner)
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(|c: char| c == '\n' || c == '\r')
}
