// src/block_csv/codec.rs

/// Cell delimiter inside a data line.
pub const DELIMITER: char = ';';

const ESCAPE: char = '\\';

/// Split one data line into its raw cells.
///
/// `\;` yields a literal `;`, `\\` a literal backslash, `\n` and `\r` a line
/// feed and carriage return; any other escaped character stands for itself.
/// A backslash at the very end of the line is dropped. Always returns at
/// least one cell. Cells are returned untrimmed.
pub fn decode_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            escaped = false;
            match c {
                'n' => cell.push('\n'),
                'r' => cell.push('\r'),
                other => cell.push(other),
            }
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            DELIMITER => cells.push(std::mem::take(&mut cell)),
            other => cell.push(other),
        }
    }
    cells.push(cell);
    cells
}

/// Escape a single cell so it survives `decode_line` unchanged.
pub fn encode_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for c in cell.chars() {
        match c {
            DELIMITER => out.push_str("\\;"),
            ESCAPE => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Encode every cell and join them into one data line (no line terminator).
pub fn encode_line<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(&encode_cell(cell.as_ref()));
    }
    line
}

/// Strip leading and trailing spaces and ASCII control characters.
///
/// Used both for line classification and for cell normalisation; other
/// Unicode whitespace (e.g. U+00A0) is kept as content.
pub(crate) fn trim_blank(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}

pub(crate) fn is_blank(s: &str) -> bool {
    trim_blank(s).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_split() {
        assert_eq!(decode_line("a;b"), vec!["a", "b"]);
        assert_eq!(decode_line(""), vec![""]);
        assert_eq!(decode_line(";"), vec!["", ""]);
        assert_eq!(decode_line(" a ; b;"), vec![" a ", " b", ""]);
    }

    #[test]
    fn test_escaped_delimiter_and_backslash() {
        assert_eq!(decode_line(r"a\;b"), vec!["a;b"]);
        assert_eq!(decode_line(r"a\\;b"), vec![r"a\", "b"]);
        assert_eq!(decode_line(r"a\\\;b"), vec![r"a\;b"]);
        assert_eq!(decode_line(r"\x\y"), vec!["xy"]);
    }

    #[test]
    fn test_newline_and_return_escapes() {
        assert_eq!(decode_line(r"a\nb"), vec!["a\nb"]);
        assert_eq!(decode_line(r"a\rb"), vec!["a\rb"]);
        assert_eq!(decode_line(r"a\\nb"), vec![r"a\nb"]);
    }

    #[test]
    fn test_dangling_escape_is_dropped() {
        assert_eq!(decode_line("a\\"), vec!["a"]);
        assert_eq!(decode_line("a;\\"), vec!["a", ""]);
        assert_eq!(decode_line("\\"), vec![""]);
    }

    #[test]
    fn test_encode_cell() {
        assert_eq!(encode_cell("plain"), "plain");
        assert_eq!(encode_cell("a;b"), r"a\;b");
        assert_eq!(encode_cell(r"c:\tmp"), r"c:\\tmp");
        assert_eq!(encode_cell("one\r\ntwo"), r"one\r\ntwo");
    }

    #[test]
    fn test_encode_line_splits_back() {
        let cells = ["id", "a;b", "x\\y", "multi\nline", ""];
        let line = encode_line(cells);
        assert_eq!(line, r"id;a\;b;x\\y;multi\nline;");
        assert_eq!(decode_line(&line), cells);
    }

    #[test]
    fn test_trim_blank_keeps_nbsp() {
        assert_eq!(trim_blank(" \t x \r"), "x");
        assert_eq!(trim_blank("\u{a0}x\u{a0}"), "\u{a0}x\u{a0}");
        assert!(is_blank(" \t"));
        assert!(!is_blank(" - "));
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(s in "\\PC*") {
            prop_assert_eq!(decode_line(&encode_cell(&s)), vec![s]);
        }

        #[test]
        fn prop_decode_never_panics(s in ".*") {
            prop_assert!(!decode_line(&s).is_empty());
        }
    }
}
