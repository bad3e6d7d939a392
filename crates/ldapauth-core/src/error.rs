//! Error types for directory operations.
//!
//! The variants mirror the failure modes of the directory protocol: local
//! validation problems, caller configuration problems, and the two transport
//! conditions (unreachable server, expired timeout) that callers may need to
//! tell apart from an ordinary rejected operation.

use thiserror::Error;

/// Main error type for directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// User identifier failed local validation, never sent to the server
    #[error("invalid user identifier: {0}")]
    InvalidIdentifier(String),

    /// Malformed distinguished name
    #[error("invalid distinguished name: {0}")]
    InvalidDn(String),

    /// Required configuration is missing or inconsistent
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The server refused an administrative bind
    #[error("bind rejected for {0}")]
    BindRejected(String),

    /// The server could not be reached
    #[error("directory unreachable: {0}")]
    Unreachable(String),

    /// A connection or operation exceeded its deadline
    #[error("directory operation timed out: {0}")]
    Timeout(String),

    /// The exchange with the server failed at the protocol level
    #[error("directory protocol error: {0}")]
    Protocol(String),
}

/// Specialized result type for directory operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the error reflects a transport failure rather than a
    /// decision made by the server or by local validation.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout(_))
    }

    /// Returns true if the error is a caller-setup defect (bad configuration
    /// or a malformed input) rather than a runtime directory outcome.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier(_) | Self::InvalidDn(_) | Self::ConfigError(_)
        )
    }
}
