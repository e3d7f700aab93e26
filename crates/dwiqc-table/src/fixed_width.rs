//! Fixed-width text layout of a group table.
//!
//! ```text
//!    Sub  Average_SNR(b<100)  Mean_FA_WM  Mean_MD_WM
//! sub-01             12.3457      0.5123         NaN
//! sub-02                   9         NaN      0.0008
//! ```
//!
//! Every column is right-aligned to the widest of its header and its cells,
//! and columns are separated by two blanks. A column therefore ends where its
//! header name ends, which is how the reader recovers the column spans. Cells
//! that do not sit flush inside their span are reported as corruption rather
//! than guessed at.

use crate::error::ParseError;
use crate::record::Cell;
use crate::table::GroupTable;
use crate::SUBJECT_FIELD;

/// Blanks between two columns
pub const SEPARATOR: &str = "  ";

/// Render the whole table. Lines end with `\n`; an empty table is `""`.
pub fn render(table: &GroupTable) -> String {
    let columns = table.columns();
    if columns.is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> =
        table.raw_rows().iter().map(|row| row.iter().map(Cell::render).collect()).collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells.iter().map(|row| row[i].chars().count()).fold(name.chars().count(), usize::max)
        })
        .collect();

    let mut out = String::new();
    write_line(&mut out, columns.iter().map(String::as_str), &widths);
    for row in &cells {
        write_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn write_line<'a>(out: &mut String, values: impl Iterator<Item = &'a str>, widths: &[usize]) {
    for (i, (value, width)) in values.zip(widths).enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        let pad = width.saturating_sub(value.chars().count());
        out.push_str(&" ".repeat(pad));
        out.push_str(value);
    }
    out.push('\n');
}

/// Parse table text written by [`render`].
///
/// Blank lines are skipped and an all-blank text is an empty table. Tables
/// carrying a leading row-index column (as written by older tooling) are
/// accepted and the index is dropped.
pub fn parse(text: &str) -> Result<GroupTable, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .filter(|(_, line)| !line.is_empty());

    let Some((header_no, header)) = lines.next() else {
        return Ok(GroupTable::new());
    };
    let spans = header_spans(header);
    let mut columns: Vec<String> = Vec::with_capacity(spans.len());
    for (name, _) in &spans {
        if columns.contains(name) {
            return Err(ParseError::new(header_no, format!("duplicate column {name:?}")));
        }
        columns.push(name.clone());
    }
    let edges: Vec<usize> = spans.iter().map(|(_, end)| *end).collect();

    let rows: Vec<(usize, Vec<char>)> =
        lines.map(|(no, line)| (no, line.chars().collect())).collect();
    let strip_index = has_row_index(&rows, edges[0]);

    let mut table = GroupTable::with_columns(columns);
    for (no, chars) in &rows {
        let row = parse_row(*no, chars, table.columns(), &edges, strip_index)?;
        table.push_row(row);
    }
    Ok(table)
}

/// Header names with the char offset just past each name
fn header_spans(header: &str) -> Vec<(String, usize)> {
    let mut spans = Vec::new();
    let mut current = String::new();
    for (pos, ch) in header.chars().enumerate() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                spans.push((std::mem::take(&mut current), pos));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        let end = header.chars().count();
        spans.push((current, end));
    }
    spans
}

/// Older tables start every row with its 0-based position in the first span.
fn has_row_index(rows: &[(usize, Vec<char>)], first_edge: usize) -> bool {
    !rows.is_empty()
        && rows.iter().enumerate().all(|(i, (_, chars))| {
            let head: String = chars.iter().take(first_edge).collect();
            let tokens: Vec<&str> = head.split_whitespace().collect();
            tokens.len() == 2 && tokens[0] == i.to_string()
        })
}

fn parse_row(
    line_no: usize,
    chars: &[char],
    columns: &[String],
    edges: &[usize],
    strip_index: bool,
) -> Result<Vec<Cell>, ParseError> {
    let last_edge = edges[edges.len() - 1];
    if chars.iter().skip(last_edge).any(|c| !c.is_whitespace()) {
        return Err(ParseError::new(line_no, "row extends past the last column"));
    }

    let mut row = Vec::with_capacity(columns.len());
    let mut lo = 0;
    for (i, (&hi, name)) in edges.iter().zip(columns).enumerate() {
        let slice: &[char] = if lo < chars.len() { &chars[lo..hi.min(chars.len())] } else { &[] };
        lo = hi;

        if i > 0 && slice.first().is_some_and(|c| !c.is_whitespace()) {
            return Err(ParseError::new(
                line_no,
                format!("value runs into column {name:?} from the left"),
            ));
        }
        let raw: String = slice.iter().collect();
        let mut text = raw.trim();
        if text.is_empty() {
            row.push(Cell::Null);
            continue;
        }
        let flush = chars.len() >= hi && !chars[hi - 1].is_whitespace();
        if !flush {
            return Err(ParseError::new(
                line_no,
                format!("value {text:?} is not aligned with column {name:?}"),
            ));
        }
        if i == 0 && strip_index {
            text = text.split_once(char::is_whitespace).map(|(_, rest)| rest.trim()).unwrap_or(text);
        }
        if text.chars().any(char::is_whitespace) {
            return Err(ParseError::new(
                line_no,
                format!("unexpected blank inside column {name:?}: {text:?}"),
            ));
        }
        // subject IDs stay text even when they look like numbers
        if name == SUBJECT_FIELD {
            row.push(Cell::parse_text(text));
        } else {
            row.push(Cell::parse(text));
        }
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricRecord;

    fn scenario_table() -> GroupTable {
        let mut table = GroupTable::new();
        let mut r1 = MetricRecord::for_subject("sub-01").unwrap();
        r1.insert("Average_SNR(b<100)", 12.345678).unwrap();
        r1.insert("Mean_FA_WM", 0.5123).unwrap();
        table.push(&r1);
        let mut r2 = MetricRecord::for_subject("sub-02").unwrap();
        r2.insert("Average_SNR(b<100)", 9.0).unwrap();
        r2.insert("Mean_MD_WM", 0.0008).unwrap();
        table.push(&r2);
        table
    }

    #[test]
    fn test_render_layout() {
        let text = render(&scenario_table());
        let expected = concat!(
            "   Sub  Average_SNR(b<100)  Mean_FA_WM  Mean_MD_WM\n",
            "sub-01             12.3457      0.5123         NaN\n",
            "sub-02                   9         NaN      0.0008\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_numeric_subject_round_trip() {
        let mut table = GroupTable::new();
        for subject in ["42", "1001"] {
            let mut record = MetricRecord::for_subject(subject).unwrap();
            record.insert("Total_Outliers", 3.0).unwrap();
            table.push(&record);
        }
        let back = parse(&render(&table)).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.cell(0, "Sub"), Some(&Cell::Text("42".into())));
        assert_eq!(back.row(1).unwrap().subject(), Some("1001"));
        assert_eq!(back.cell(1, "Total_Outliers"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&GroupTable::new()), "");
        assert_eq!(parse("").unwrap(), GroupTable::new());
        assert_eq!(parse("\n  \n").unwrap(), GroupTable::new());
    }

    #[test]
    fn test_parse_round_trip() {
        let table = scenario_table();
        let back = parse(&render(&table)).unwrap();
        assert_eq!(back.columns(), table.columns());
        assert_eq!(back.cell(0, "Average_SNR(b<100)"), Some(&Cell::Number(12.3457)));
        assert_eq!(back.cell(0, "Mean_MD_WM"), Some(&Cell::Null));
        assert_eq!(back.cell(1, "Sub"), Some(&Cell::Text("sub-02".into())));
        assert_eq!(back.cell(1, "Mean_MD_WM"), Some(&Cell::Number(0.0008)));
    }

    #[test]
    fn test_rerender_is_byte_identical() {
        let once = render(&scenario_table());
        let twice = render(&parse(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_header_only() {
        let table = parse("Sub  X\n").unwrap();
        assert_eq!(table.columns(), ["Sub", "X"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_tolerates_wide_padding_and_crlf() {
        let text = "      Sub        X\r\n   sub-01        1\r\n\r\n";
        let table = parse(text).unwrap();
        assert_eq!(table.cell(0, "Sub"), Some(&Cell::Text("sub-01".into())));
        assert_eq!(table.cell(0, "X"), Some(&Cell::Number(1.0)));
    }

    #[test]
    fn test_parse_missing_trailing_cells_are_null() {
        let text = "   Sub  X  Y\nsub-01  1\n";
        let table = parse(text).unwrap();
        assert_eq!(table.cell(0, "X"), Some(&Cell::Number(1.0)));
        assert_eq!(table.cell(0, "Y"), Some(&Cell::Null));
    }

    #[test]
    fn test_parse_rejects_extra_cells() {
        let err = parse("Sub  X\n  a  1  2\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_parse_rejects_misaligned_cells() {
        // "12.5" straddles the boundary between Sub and X
        assert!(parse("   Sub       X\nsub-0112.5    \n").is_err());
        // left-aligned value does not end at its column edge
        assert!(parse("   Sub       X\nsub-01  1.5   \n").is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_columns() {
        let err = parse("Sub  X  X\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("duplicate"));
    }

    #[test]
    fn test_parse_drops_legacy_row_index() {
        let text = concat!(
            "      Sub  Mean_FA_WM\n",
            "0  sub-01      0.5123\n",
            "1  sub-02         NaN\n",
        );
        let table = parse(text).unwrap();
        assert_eq!(table.columns(), ["Sub", "Mean_FA_WM"]);
        assert_eq!(table.cell(1, "Sub"), Some(&Cell::Text("sub-02".into())));
        assert_eq!(table.cell(1, "Mean_FA_WM"), Some(&Cell::Null));
    }
}
