//! Record parsing.
//!
//! Each non-blank data line becomes a `Record` keyed by the feed's schema, or is
//! dropped whole when it does not fit. A bad line never aborts the feed and
//! never yields a partially keyed record.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::Record;

/// Records parsed from one payload plus row accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    pub records: Vec<Record>,
    /// Non-blank, non-comment data lines seen.
    pub lines_read: usize,
    /// Lines dropped because they did not match the schema.
    pub malformed: usize,
}

/// Indicator lines from a plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLines {
    pub lines: Vec<String>,
    pub lines_read: usize,
}

/// Parse the text after a discovered header.
pub fn parse_records(text: &str, fields: &[String]) -> ParsedRecords {
    parse_csv(text, fields, false)
}

/// Parse a CSV whose schema is declared rather than discovered.
///
/// A row that just repeats the declared field names is the publisher's own header
/// line and is skipped.
pub fn parse_fixed_records(text: &str, fields: &[String]) -> ParsedRecords {
    parse_csv(text, fields, true)
}

fn parse_csv(text: &str, fields: &[String], skip_header_echo: bool) -> ParsedRecords {
    let mut out = ParsedRecords::default();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = parse_line(line);
        if skip_header_echo {
            if let Some(row) = &row {
                if row.iter().eq(fields.iter().map(String::as_str)) {
                    continue;
                }
            }
        }

        out.lines_read += 1;
        match row.and_then(|row| to_record(&row, fields)) {
            Some(record) => out.records.push(record),
            None => out.malformed += 1,
        }
    }
    out
}

/// Parse one line as one CSV row. Quoting never reaches past the line, so an
/// unbalanced quote only costs this line.
fn parse_line(line: &str) -> Option<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(line.as_bytes());

    let mut rows = reader.records();
    let row = rows.next()?.ok()?;
    match rows.next() {
        None => Some(row),
        Some(_) => None,
    }
}

fn to_record(row: &StringRecord, fields: &[String]) -> Option<Record> {
    if row.len() != fields.len() {
        return None;
    }
    let pairs = fields
        .iter()
        .zip(row.iter())
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();
    Some(Record::new(pairs))
}

/// Split a plain list into trimmed entries, skipping blanks and `#` comments.
pub fn parse_lines(text: &str) -> ParsedLines {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    ParsedLines {
        lines_read: lines.len(),
        lines,
    }
}
