//! Error types for reading capture files

use thiserror::Error;

/// Structural problems found while reading a delimited capture file.
///
/// These carry no position; readers attach the line with [`FormatError::at_line`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("first column must be a time column, found '{found}'")]
    TimeColumn { found: String },

    #[error("column {column} '{header}': {message}")]
    Header {
        column: usize,
        header: String,
        message: String,
    },

    #[error("expected {expected} fields, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column {column}: invalid number '{value}'")]
    InvalidNumber { column: usize, value: String },

    #[error("time {time} does not follow previous time {previous}")]
    TimeOrder { time: f64, previous: f64 },

    #[error("body '{body}' has a zero-length rotation quaternion")]
    ZeroRotation { body: String },
}

impl FormatError {
    /// Locate this error at a 1-based line of the file
    pub fn at_line(self, line: usize) -> cldview_core::Error {
        cldview_core::Error::parse(line, self.to_string())
    }
}
