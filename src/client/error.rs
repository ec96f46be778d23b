// ABOUTME: Error types for Socket-to-Air sessions, the pool-backed service and its configuration
// ABOUTME: Separates transient network faults, which trigger reconnection, from protocol errors

use crate::client::session::SessionState;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::datatypes::ResultError;
use crate::pool::PoolError;
use std::io;
use thiserror::Error;
use tokio::task::JoinError;

/// Caller input that violates a length or range constraint.
///
/// Raised before anything is written to the connection, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} too long, max {max}")]
    CredentialTooLong { field: &'static str, max: usize },

    #[error("recipient number too long, max {max}")]
    RecipientTooLong { max: usize },

    #[error("recipient number is empty")]
    EmptyRecipient,

    #[error("message too long, max {max}")]
    MessageTooLong { max: usize },

    #[error("expiry must be between 1 and {max} minutes, got {minutes}")]
    ExpiryOutOfRange { minutes: u64, max: u64 },
}

/// Comprehensive error type for Socket-to-Air operations
#[derive(Debug, Error)]
pub enum S2aError {
    /// TCP connection to the gateway could not be established
    #[error("Dial error: {0}")]
    Dial(#[source] io::Error),

    /// I/O error on an established connection
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    /// The gateway closed the connection
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// No response within the configured read timeout
    #[error("Operation timeout")]
    Timeout,

    /// Non-zero result code from the gateway
    #[error(transparent)]
    Gateway(#[from] ResultError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A send succeeded but the gateway returned no message id
    #[error("Unexpected ret_content_len 0")]
    EmptyMessageId,

    /// Session not in the state the operation requires
    #[error("Invalid session state: {0:?}")]
    InvalidState(SessionState),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The task running an exchange panicked or was aborted
    #[error("Operation task failed: {0}")]
    Task(#[from] JoinError),
}

impl S2aError {
    /// True for network-level failures.
    ///
    /// A session that failed this way must be repaired before reuse. Every
    /// other error leaves the connection usable.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            S2aError::Dial(_)
                | S2aError::Connection(_)
                | S2aError::ConnectionClosed
                | S2aError::Timeout
        )
    }

    /// The classified gateway result, if this error carries one
    pub fn result_error(&self) -> Option<&ResultError> {
        match self {
            S2aError::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for Socket-to-Air operations
pub type S2aResult<T> = Result<T, S2aError>;
