//! Tipcast error types

use thiserror::Error;

/// Tipcast error type
#[derive(Error, Debug)]
pub enum Error {
    /// Content document is missing required fields or carries malformed values
    #[error("Malformed content: {0}")]
    MalformedContent(String),

    /// Content source could not be read, or the read timed out
    #[error("Content source unavailable: {0}")]
    SourceUnavailable(String),

    /// No records are loaded; "most recent" is undefined
    #[error("Content corpus is empty")]
    EmptyCorpus,

    /// Category has no records in the current corpus
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Subscriber registry could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Single push-transport send failed; dispatch aggregates these into
    /// per-subscriber delivery failures instead of surfacing them
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for tipcast operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownCategory("fitness".to_string());
        assert_eq!(err.to_string(), "Unknown category: fitness");

        let err = Error::EmptyCorpus;
        assert_eq!(err.to_string(), "Content corpus is empty");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
