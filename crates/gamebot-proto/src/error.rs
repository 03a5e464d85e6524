//! Error types for the protocol crate.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be parsed as an IRC message.
    #[error("invalid message '{string}': {cause}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// What was wrong with it.
        cause: MessageParseError,
    },
}

/// Reasons a single line fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// The line was empty or only whitespace.
    #[error("empty message")]
    EmptyMessage,

    /// A prefix (`:nick!user@host`) was present but nothing followed it.
    #[error("missing command after prefix")]
    MissingCommand,

    /// A tag block (`@...`) was present but nothing followed it.
    #[error("missing command after tags")]
    MissingCommandAfterTags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_display() {
        let err = ProtocolError::InvalidMessage {
            string: ":nick!u@h".to_string(),
            cause: MessageParseError::MissingCommand,
        };
        assert_eq!(
            err.to_string(),
            "invalid message ':nick!u@h': missing command after prefix"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io(_)));
        assert_eq!(err.to_string(), "io error: broken pipe");
    }
}
