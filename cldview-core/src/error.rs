//! Error types for cldview

use thiserror::Error;

/// Main error type for cldview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse { line: Option<usize>, message: String },

    #[error("No motion data: {0}")]
    EmptyData(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Corrupt position data: {0}")]
    CorruptData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// Shorthand for a parse error located at a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Parse error concerning the whole file, e.g. when it cannot be read at all
    pub fn parse_file(message: impl Into<String>) -> Self {
        Error::Parse {
            line: None,
            message: message.into(),
        }
    }
}

/// Result type alias for cldview operations
pub type Result<T> = std::result::Result<T, Error>;
