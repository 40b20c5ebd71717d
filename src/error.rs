//! Error type shared by the storage, import/export and session layers.
//!
//! The grading engine and the due filter are total and never produce these.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Invalid stored value in column '{column}': {value}")]
    InvalidColumn { column: &'static str, value: String },

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Deck '{0}' already exists")]
    DuplicateDeck(String),

    #[error("Invalid export at {path}: {message}")]
    Validation { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = Error::validation("cards[2].srs.ease", "must be within [1.3, 3.5]");
        assert_eq!(
            err.to_string(),
            "Invalid export at cards[2].srs.ease: must be within [1.3, 3.5]"
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
