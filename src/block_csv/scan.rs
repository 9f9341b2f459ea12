// src/block_csv/scan.rs
use tracing::trace;

use super::codec::trim_blank;

/// Prefix of a line that opens a named block. The trailing space is part of it.
pub const BLOCK_INDICATOR: &str = "#! block ";

/// What a physical line is, judged on its trimmed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// Block marker with its (trimmed) name.
    BlockMarker(&'a str),
    Data,
}

pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = trim_blank(line);
    if trimmed.is_empty() {
        LineKind::Blank
    } else if let Some(name) = trimmed.strip_prefix(BLOCK_INDICATOR) {
        LineKind::BlockMarker(trim_blank(name))
    } else if trimmed.starts_with('#') {
        LineKind::Comment
    } else {
        LineKind::Data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    SeekingBlock,
    InTargetBlock,
    Done,
}

/// Tracks whether the reader is inside the requested block.
///
/// `None` selects the default block, i.e. everything before the first marker.
/// The requested block is read as one contiguous run: any marker seen while
/// inside it ends the scan.
#[derive(Debug)]
pub struct BlockScanner<'a> {
    target: Option<&'a str>,
    mode: ScanMode,
}

impl<'a> BlockScanner<'a> {
    pub fn new(target: Option<&'a str>) -> Self {
        let mode = match target {
            None => ScanMode::InTargetBlock,
            Some(_) => ScanMode::SeekingBlock,
        };
        Self { target, mode }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn is_done(&self) -> bool {
        self.mode == ScanMode::Done
    }

    /// Feed one classified line; returns `true` if it is a data line to keep.
    pub fn advance(&mut self, kind: LineKind<'_>) -> bool {
        match (self.mode, kind) {
            (ScanMode::Done, _) => false,
            (ScanMode::InTargetBlock, LineKind::BlockMarker(name)) => {
                trace!(block = name, "block boundary reached, stopping");
                self.mode = ScanMode::Done;
                false
            }
            (ScanMode::SeekingBlock, LineKind::BlockMarker(name)) => {
                if self.target == Some(name) {
                    trace!(block = name, "entering requested block");
                    self.mode = ScanMode::InTargetBlock;
                }
                false
            }
            (ScanMode::InTargetBlock, LineKind::Data) => true,
            _ => false,
        }
    }
}
