//! Common error types for Tunesmith

use thiserror::Error;

/// Common result type for Tunesmith operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the service.
///
/// The first five variants are the failure kinds callers branch on;
/// the rest cover ambient concerns (configuration, I/O, unexpected
/// provider responses).
#[derive(Error, Debug)]
pub enum Error {
    /// Definitive authentication rejection: missing, invalid, or revoked
    /// credentials. Unrecoverable without re-authenticating.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// Transient provider failure: network error, timeout, rate limit,
    /// or 5xx. Retryable; must never force a logout.
    #[error("Provider temporarily unavailable: {0}")]
    TransientProvider(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Generative output missing or unparseable
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A multi-step commit completed its first steps and failed a later one,
    /// leaving observable intermediate state. Carries the created playlist id
    /// so the caller can retry insertion instead of recreating the playlist.
    #[error("Playlist {playlist_id} created but track insertion failed: {detail}")]
    PartialFailure { playlist_id: String, detail: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransientProvider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(Error::TransientProvider("429".into()).is_retryable());
        assert!(!Error::Auth("expired".into()).is_retryable());
        assert!(!Error::Validation("empty name".into()).is_retryable());
    }

    #[test]
    fn partial_failure_names_the_playlist() {
        let err = Error::PartialFailure {
            playlist_id: "3cEYpjA9oz9GiPac4AsH4n".into(),
            detail: "insert failed".into(),
        };
        assert!(err.to_string().contains("3cEYpjA9oz9GiPac4AsH4n"));
    }
}
