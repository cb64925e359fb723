//! Delimited text tables shared by the mocap and dataset formats
//!
//! Both lab formats are plain text tables:
//! - a header line whose first column holds the time in seconds
//! - every other column named `<body><sep><field>`, e.g. `Person1/x` or `Camera qw`
//! - one frame per line
//! - delimiter auto-detected from the header (comma, tab, semicolon or whitespace)
//! - blank lines and lines starting with `#` are skipped

use crate::error::FormatError;
use cldview_core::{Error, Result};
use std::io::{BufRead, Lines};

/// Separators accepted between the body name and the field in a column name
pub(crate) const NAME_SEPARATORS: [char; 5] = [':', '/', '.', '_', ' '];

/// Supported delimiters for capture tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Semicolon,
    /// Runs of spaces and tabs
    Whitespace,
}

impl Delimiter {
    /// Get the character representation of the delimiter
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
            Delimiter::Whitespace => ' ',
        }
    }

    /// Detect the delimiter from the header line.
    ///
    /// Column names may contain spaces, so whitespace is only chosen when no
    /// comma, tab or semicolon appears at all.
    pub fn detect_from_line(line: &str) -> Self {
        let counts = [
            (line.matches(',').count(), Delimiter::Comma),
            (line.matches('\t').count(), Delimiter::Tab),
            (line.matches(';').count(), Delimiter::Semicolon),
        ];

        counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .max_by_key(|(count, _)| *count)
            .map(|(_, delimiter)| *delimiter)
            .unwrap_or(Delimiter::Whitespace)
    }

    /// Split a line into trimmed fields
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            _ => line.split(self.as_char()).map(str::trim).collect(),
        }
    }
}

/// Whether a header cell names the time column
pub fn is_time_header(cell: &str) -> bool {
    let cell = cell.trim().to_lowercase();
    matches!(cell.as_str(), "t" | "time" | "timestamp" | "seconds" | "secs")
        || cell.starts_with("time (")
        || cell.starts_with("time[")
}

/// Split a column name into `(body, field)` at its last separator.
///
/// Returns `None` when the name has no separator or either part is empty.
pub fn split_column_name(header: &str) -> Option<(&str, &str)> {
    let header = header.trim();
    let index = header.rfind(NAME_SEPARATORS)?;
    let body = header[..index].trim_end();
    let field = header[index + 1..].trim_start();
    if body.is_empty() || field.is_empty() {
        return None;
    }
    Some((body, field))
}

/// Parse one data cell. Empty and `NaN` cells mean "not captured this frame".
fn parse_cell(value: &str, column: usize) -> std::result::Result<Option<f64>, FormatError> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(FormatError::InvalidNumber {
            column,
            value: value.to_string(),
        }),
    }
}

/// One frame of a capture table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line number in the file
    pub line: usize,
    /// Seconds from the start of the recording
    pub time: f64,
    /// One entry per value column; `None` for a missing value
    pub values: Vec<Option<f64>>,
}

/// Streaming reader over a capture table.
///
/// The header is read on construction; iteration yields one [`Record`] per frame
/// and checks column counts and time ordering as it goes.
pub struct TableReader<R> {
    lines: Lines<R>,
    line: usize,
    delimiter: Delimiter,
    columns: Vec<String>,
    previous_time: Option<f64>,
}

impl<R: BufRead> TableReader<R> {
    /// Read the header and prepare to stream records.
    ///
    /// A source with nothing but blanks and comments is [`Error::EmptyData`].
    pub fn new(reader: R) -> Result<Self> {
        let mut table = Self {
            lines: reader.lines(),
            line: 0,
            delimiter: Delimiter::Whitespace,
            columns: Vec::new(),
            previous_time: None,
        };

        let (line_no, header) = match table.next_line() {
            Some(line) => line?,
            None => return Err(Error::EmptyData("file has no header line".to_string())),
        };
        let header = header.trim_start_matches('\u{feff}');

        table.delimiter = Delimiter::detect_from_line(header);
        let mut cells = table.delimiter.split(header).into_iter();
        let time = cells.next().unwrap_or_default();
        if !is_time_header(time) {
            return Err(FormatError::TimeColumn {
                found: time.to_string(),
            }
            .at_line(line_no));
        }
        table.columns = cells.map(str::to_string).collect();
        Ok(table)
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Names of the value columns, i.e. every column after the time column
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Next line with content, skipping blanks and comments
    fn next_line(&mut self) -> Option<Result<(usize, String)>> {
        for line in self.lines.by_ref() {
            self.line += 1;
            match line {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    return Some(Ok((self.line, text)));
                }
                Err(e) => {
                    return Some(Err(Error::parse(self.line, format!("unreadable line: {}", e))))
                }
            }
        }
        None
    }

    fn parse_record(&mut self, line: usize, text: &str) -> std::result::Result<Record, FormatError> {
        let fields = self.delimiter.split(text);
        let expected = self.columns.len() + 1;
        if fields.len() != expected {
            return Err(FormatError::ColumnCount {
                expected,
                found: fields.len(),
            });
        }

        let time = parse_cell(fields[0], 1)?.ok_or_else(|| FormatError::InvalidNumber {
            column: 1,
            value: fields[0].to_string(),
        })?;
        if let Some(previous) = self.previous_time {
            if time <= previous {
                return Err(FormatError::TimeOrder { time, previous });
            }
        }
        self.previous_time = Some(time);

        let values = fields[1..]
            .iter()
            .enumerate()
            .map(|(i, value)| parse_cell(value, i + 2))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Record { line, time, values })
    }
}

impl<R: BufRead> Iterator for TableReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line, text) = match self.next_line()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        Some(self.parse_record(line, &text).map_err(|e| e.at_line(line)))
    }
}
