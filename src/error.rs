//! Unified error handling for irc-gamebot.
//!
//! Each layer has its own error enum; [`BotError`] is what the session loop
//! hands back to `main`. Only transport errors end a session.

use gamebot_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Transport Errors (fatal to the session)
// ============================================================================

/// Failures of the underlying byte stream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("no usable root certificates in the platform trust store")]
    NoRootCertificates,

    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed: {0}")]
    Read(#[source] ProtocolError),

    #[error("write failed: {0}")]
    Write(#[source] ProtocolError),
}

impl TransportError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::NoRootCertificates => "no_root_certificates",
            Self::Handshake { .. } => "tls_handshake",
            Self::Read(_) => "read",
            Self::Write(_) => "write",
        }
    }
}

// ============================================================================
// Channel Store Errors
// ============================================================================

/// Failures loading or saving the persisted channel list.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("channel file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel file is malformed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize channel list: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ============================================================================
// Search Gateway Errors (reported to the channel, never fatal)
// ============================================================================

/// Failures of the game search gateway.
///
/// The `Display` text is what users see after `Search failed: `.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("IGDB API credentials not configured")]
    NotConfigured,

    #[error("could not obtain access token: {0}")]
    Credentials(String),

    #[error("API error: {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors that end a bot run.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display_is_user_facing() {
        assert_eq!(
            GatewayError::NotConfigured.to_string(),
            "IGDB API credentials not configured"
        );
        assert_eq!(GatewayError::Status(401).to_string(), "API error: 401");
    }

    #[test]
    fn test_transport_error_codes() {
        let err = TransportError::Connect {
            addr: "irc.example.net:6667".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert_eq!(err.error_code(), "connect");
        assert_eq!(
            err.to_string(),
            "failed to connect to irc.example.net:6667: refused"
        );
        assert_eq!(TransportError::NoRootCertificates.error_code(), "no_root_certificates");
    }

    #[test]
    fn test_bot_error_is_transparent() {
        let err: BotError = TransportError::InvalidServerName("bad host".to_string()).into();
        assert_eq!(err.to_string(), "invalid TLS server name: bad host");
    }
}
