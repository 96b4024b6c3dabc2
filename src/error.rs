use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while staging, writing, or reading an index store
#[derive(Error, Debug)]
pub enum IndexError {
    /// A required argument was empty or otherwise unusable. Nothing was mutated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A read landed outside its region or hit bytes that do not decode.
    #[error("Corrupted {region} region at offset {offset}: {reason}")]
    Corrupted {
        region: &'static str,
        offset: i64,
        reason: String,
    },

    /// The configuration file or app data directory could not be used.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Index store is missing or incomplete: {}", .0.display())]
    MissingStore(PathBuf),

    /// The keyword map and path map of a document disagree.
    #[error("Inconsistent document: {0}")]
    Inconsistent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub(crate) fn corrupted(region: &'static str, offset: usize, reason: impl Into<String>) -> Self {
        IndexError::Corrupted {
            region,
            offset: offset as i64,
            reason: reason.into(),
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, IndexError::Corrupted { .. })
    }
}

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;
