pub mod block_csv;

pub use block_csv::{
    codec::{decode_line, encode_cell, encode_line},
    row::{Row, MIN_ROW_WIDTH},
    scan::BLOCK_INDICATOR,
    writer::BlockCsvWriter,
    BlockCsvFile, CsvReader, RowFilter,
};
