use std::borrow::Cow;

use csv::{ByteRecord, ReaderBuilder, Trim};

use super::error::{ClipError, ClipResult};

const COLUMNS: usize = 3;

/// One CSV line, still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the submitted file.
    pub line: usize,
    pub start: String,
    pub end: String,
    pub name: String,
}

/// Split a CSV payload into `start,end,label` rows.
///
/// Fails on the first row that does not have exactly three columns. `\n`,
/// `\r\n` and bare `\r` are all accepted as line endings, and blank lines are
/// skipped but still counted. Fields that are not UTF-8 are read as Latin-1,
/// which is what spreadsheet exports usually are. An empty payload yields no
/// rows; the caller decides what that means.
pub fn parse_rows(input: &[u8]) -> ClipResult<Vec<RawRow>> {
    let input = normalize_newlines(input);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(&*input);

    let mut rows = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|pos| line_of_record(&input, pos.byte() as usize))
            .unwrap_or(index + 1);
        rows.push(row_from_record(&record, line)?);
    }
    Ok(rows)
}

/// 1-based line on which the record found by scanning from `offset` begins.
///
/// The reader reports where it started scanning, which sits before any blank
/// lines it skipped on the way to the record.
fn line_of_record(input: &[u8], offset: usize) -> usize {
    let mut start = offset.min(input.len());
    while input.get(start) == Some(&b'\n') {
        start += 1;
    }
    input[..start].iter().filter(|&&byte| byte == b'\n').count() + 1
}

/// Rewrite `\r\n` and lone `\r` as `\n` so line numbers count every ending.
pub fn normalize_newlines(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.contains(&b'\r') {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte == b'\r' {
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
            }
            out.push(b'\n');
        } else {
            out.push(byte);
        }
    }
    Cow::Owned(out)
}

fn row_from_record(record: &ByteRecord, line: usize) -> ClipResult<RawRow> {
    let found = record.len();
    if found > COLUMNS {
        return Err(ClipError::TooManyColumns { row: line, found });
    }
    if found < COLUMNS {
        return Err(ClipError::TooFewColumns { row: line, found });
    }

    Ok(RawRow {
        line,
        start: decode_field(&record[0]),
        end: decode_field(&record[1]),
        name: decode_field(&record[2]),
    })
}

fn decode_field(field: &[u8]) -> String {
    match std::str::from_utf8(field) {
        Ok(text) => text.to_string(),
        Err(_) => field.iter().map(|&byte| char::from(byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_fields_and_numbers_lines() {
        let rows = parse_rows(b"0:10, 0:20 ,  Intro \n1:00:00,1:00:30,Finale\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            RawRow {
                line: 1,
                start: "0:10".to_string(),
                end: "0:20".to_string(),
                name: "Intro".to_string(),
            }
        );
        assert_eq!(rows[1].line, 2);
        assert_eq!(rows[1].name, "Finale");
    }

    #[test]
    fn quoted_labels_may_contain_commas() {
        let rows = parse_rows(b"0:10,0:20,\"Well, well\"\n").unwrap();
        assert_eq!(rows[0].name, "Well, well");
    }

    #[test]
    fn too_many_columns_reports_line() {
        let err = parse_rows(b"0:10,0:20,Intro\n0:30,0:40,Scene, two\n").unwrap_err();
        match err {
            ClipError::TooManyColumns { row, found } => {
                assert_eq!(row, 2);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn too_few_columns_reports_line() {
        let err = parse_rows(b"0:10,0:20\n").unwrap_err();
        assert!(matches!(err, ClipError::TooFewColumns { row: 1, found: 2 }));
    }

    #[test]
    fn accepts_every_newline_convention() {
        let unix = parse_rows(b"0:01,0:02,a\n0:03,0:04,b\n").unwrap();
        let windows = parse_rows(b"0:01,0:02,a\r\n0:03,0:04,b\r\n").unwrap();
        let classic_mac = parse_rows(b"0:01,0:02,a\r0:03,0:04,b\r").unwrap();
        assert_eq!(unix.len(), 2);
        assert_eq!(windows, unix);
        assert_eq!(classic_mac, unix);
    }

    #[test]
    fn blank_lines_are_skipped_but_counted() {
        let err = parse_rows(b"0:01,0:02,a\r\n\r\n0:03,0:04\r\n").unwrap_err();
        assert_eq!(err.row(), Some(3));

        let err = parse_rows(b"0:01,0:02,a\n\n\n0:03,0:04\n").unwrap_err();
        assert_eq!(err.row(), Some(4));
    }

    #[test]
    fn leading_blank_lines_are_counted() {
        let err = parse_rows(b"\n\n\n0:01,0:02\n").unwrap_err();
        assert_eq!(err.row(), Some(4));

        let rows = parse_rows(b"\n\n0:01,0:02,a\n\n\n\n0:03,0:04,b\n").unwrap();
        let lines: Vec<usize> = rows.iter().map(|row| row.line).collect();
        assert_eq!(lines, [3, 7]);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let rows = parse_rows(b"\xEF\xBB\xBF0:10,0:20,a\n").unwrap();
        assert_eq!(rows[0].start, "0:10");
        assert_eq!(rows[0].line, 1);
    }

    #[test]
    fn latin1_labels_are_decoded() {
        let rows = parse_rows(b"0:10,0:20,Caf\xe9\n0:30,0:40,Caf\xc3\xa9\n").unwrap();
        assert_eq!(rows[0].name, "Café");
        assert_eq!(rows[1].name, "Café");
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(&*normalize_newlines(b"a\r\nb\rc\n"), b"a\nb\nc\n");
        assert!(matches!(normalize_newlines(b"a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn empty_payload_has_no_rows() {
        assert!(parse_rows(b"").unwrap().is_empty());
        assert!(parse_rows(b"\n\n").unwrap().is_empty());
    }
}
