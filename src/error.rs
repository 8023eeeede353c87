//! Error taxonomy for x-radar
//!
//! Every failure an operation can surface is a `RadarError`. Each variant maps
//! to one of the three envelope codes and to a process exit code.

use thiserror::Error;

/// Errors surfaced to the caller of a query operation
#[derive(Debug, Error)]
pub enum RadarError {
    /// Malformed user input, rejected before any network access
    #[error("{0}")]
    Validation(String),

    /// No bearer token configured when a live request was needed
    #[error("{0}")]
    Auth(String),

    /// Unusable environment configuration
    #[error("{0}")]
    Config(String),

    /// The provider answered with a non-2xx status
    #[error("X API request failed ({status} {reason}): {detail}")]
    Provider {
        status: u16,
        reason: String,
        detail: String,
    },

    /// DNS, connection, or timeout failure
    #[error("{0}")]
    Network(String),

    /// A 2xx response whose body was not JSON
    #[error("{0}")]
    Protocol(String),

    /// Anything unanticipated
    #[error("{0}")]
    Internal(String),
}

impl RadarError {
    /// Envelope code reported in `{"error": {"code": ...}}`
    pub fn code(&self) -> &'static str {
        match self {
            RadarError::Validation(_) => "invalid_arguments",
            RadarError::Internal(_) => "internal_error",
            RadarError::Auth(_)
            | RadarError::Config(_)
            | RadarError::Provider { .. }
            | RadarError::Network(_)
            | RadarError::Protocol(_) => "runtime_error",
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            RadarError::Validation(_) => 2,
            _ => 1,
        }
    }
}
