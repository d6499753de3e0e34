//! Error taxonomy for an export run. Every variant is fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("data source unreachable: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("bad timestamp {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<rusqlite::Error> for ExportError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(ref f, _)
                if f.code == rusqlite::ErrorCode::CannotOpen =>
            {
                Self::Connection(e.to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<postgres::Error> for ExportError {
    fn from(e: postgres::Error) -> Self {
        if e.is_closed() {
            Self::Connection(e.to_string())
        } else {
            Self::Query(e.to_string())
        }
    }
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
