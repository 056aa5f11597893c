use crate::units::{ParseError, StandardizeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("'{0}' is not a measurement")]
    Malformed(String),
    #[error("'{0}' is a range, not a single value")]
    Range(String),
    #[error("'{0}' has a zero value")]
    ZeroValue(String),
    #[error("invalid number in '{0}'")]
    InvalidNumber(String),
    #[error("bad unit in '{cell}': {source}")]
    Unit {
        cell: String,
        #[source]
        source: ParseError,
    },
    #[error("cannot standardize '{cell}': {source}")]
    Standardize {
        cell: String,
        #[source]
        source: StandardizeError,
    },
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IngestError {
    /// Fatal errors abort the whole run; the rest only mark a cell as broken.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestError::Standardize { .. } | IngestError::Io(_) | IngestError::Toml(_)
        )
    }
}
