// src/bin/block_dump.rs

use anyhow::{Context, Result};
use blockcsv::{decode_line, BlockCsvFile, CsvReader, Row};
use clap::Parser;
use glob::glob;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Print the rows of one block of block-CSV files")]
struct Args {
    /// Glob patterns of files to read
    #[arg(required = true)]
    patterns: Vec<String>,
    /// Block to read; the default block when omitted
    #[arg(short, long)]
    block: Option<String>,
    /// Keep only rows whose first cell equals this value
    #[arg(long)]
    filter_first_cell: Option<String>,
    /// Report whether each file has a row matching this `;`-separated
    /// pattern. Cells are trimmed; a bare `*` matches any cell and `\*`
    /// matches a literal `*`
    #[arg(long = "match", conflicts_with = "json")]
    pattern: Option<String>,
    /// One JSON object per row instead of the diagnostic rendering
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    file: String,
    location: &'a str,
    cells: &'a [String],
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_writer(std::io::stderr).init();

    let args = Args::parse();

    // ─── 2) expand globs ─────────────────────────────────────────────
    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in &args.patterns {
        let before = paths.len();
        paths.extend(
            glob(pattern)
                .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
                .filter_map(|entry| entry.ok()),
        );
        if paths.len() == before {
            warn!("no files match '{}'", pattern);
        }
    }
    info!("{} files to read", paths.len());

    // ─── 3) parse every file in parallel ────────────────────────────
    let parsed: Vec<(PathBuf, BlockCsvFile)> = paths
        .into_par_iter()
        .map(|path| -> Result<(PathBuf, BlockCsvFile)> {
            let mut reader = CsvReader::new();
            if let Some(block) = &args.block {
                reader = reader.block(block.as_str());
            }
            if let Some(first) = &args.filter_first_cell {
                reader = reader.filter(move |row: &Row| row.cell(0) == first.as_str());
            }
            let file = reader
                .read_path(&path)
                .with_context(|| format!("Failed to parse '{}'", path.display()))?;
            Ok((path, file))
        })
        .collect::<Result<Vec<_>>>()?;

    let pattern = args.pattern.as_deref().map(parse_pattern);

    // ─── 4) print ────────────────────────────────────────────────────
    let mut total = 0usize;
    for (path, file) in &parsed {
        info!(file = %path.display(), rows = file.len(), "parsed");
        total += file.len();

        if let Some(pattern) = &pattern {
            let pattern: Vec<Option<&str>> = pattern.iter().map(|c| c.as_deref()).collect();
            println!("{}: {}", path.display(), file.contains(&pattern));
            continue;
        }

        for row in file {
            if args.json {
                let out = JsonRow {
                    file: path.display().to_string(),
                    location: row.location(),
                    cells: &row.cells()[..row.significant_length()],
                };
                println!("{}", serde_json::to_string(&out)?);
            } else {
                println!("{}: {}", row.location(), row);
            }
        }
    }

    info!("{} rows from {} files", total, parsed.len());
    Ok(())
}

/// Turn a `--match` argument into a containment pattern. Cells use the data
/// line grammar and are trimmed like row cells; an unescaped `*` cell is a
/// wildcard.
fn parse_pattern(pattern: &str) -> Vec<Option<String>> {
    raw_cells(pattern)
        .into_iter()
        .map(|raw| {
            if trim(raw) == "*" {
                return None;
            }
            let decoded = decode_line(raw).concat();
            Some(trim(&decoded).to_string())
        })
        .collect()
}

/// Split on unescaped `;`, keeping escapes in place.
fn raw_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ';' => {
                cells.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    cells.push(&line[start..]);
    cells
}

fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}
