//! Error taxonomy for action execution.
//!
//! Failures are classified so callers can react programmatically:
//! - [`Error::Validation`] never reaches the network; it is raised
//!   synchronously by the entity method that would have built the action.
//! - [`Error::PreconditionFailed`] and [`Error::Cancelled`] settle an action
//!   locally at dispatch time.
//! - [`Error::Http`] / [`Error::Connection`] are transport-level problems
//!   where a retry might help.
//! - [`Error::Response`] is a remote rejection carrying Discord's
//!   machine-readable JSON error code.
//! - [`Error::Decode`] means a nominally successful payload could not be
//!   interpreted; it is never silently defaulted.

use std::time::Duration;

use thiserror::Error;

use crate::permissions::Permissions;

/// Errors produced while constructing or executing actions.
#[derive(Error, Debug)]
pub enum Error {
    /// Local validation failed before any action was constructed
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// A pre-flight check returned false at dispatch time
    #[error("pre-flight check failed, action aborted before dispatch")]
    PreconditionFailed,

    /// The action was cancelled before dispatch began
    #[error("action cancelled")]
    Cancelled,

    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failed without an underlying HTTP error (test doubles,
    /// custom transports)
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Discord processed the request and declined it
    #[error("Discord API error {status}: {code} - {message}")]
    Response {
        status: u16,
        code: ErrorCode,
        message: String,
    },

    /// Rate limited and the transport's retry budget is exhausted
    #[error("rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: f64 },

    /// A successful payload could not be interpreted
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl Error {
    /// Build a decode failure from any displayable cause.
    pub(crate) fn decode(cause: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: cause.to_string(),
        }
    }

    /// Check if retrying the operation might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Connection { .. } | Self::RateLimited { .. } => true,
            Self::Response { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get the suggested retry delay, if the server provided one.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(Duration::from_secs_f64(*retry_after)),
            _ => None,
        }
    }

    /// Get the machine-readable Discord error code for remote rejections.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Response { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Local validation failures raised before network work is constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The current user lacks a permission required for the operation
    #[error("missing permission: {required}")]
    MissingPermission { required: Permissions },

    /// The current user's highest role does not outrank the target
    #[error("role hierarchy: actor position {actor} does not outrank target position {target}")]
    Hierarchy { actor: i64, target: i64 },

    /// A numeric argument fell outside the endpoint's declared bounds
    #[error("{what} must be within {min}..={max}, got {value}")]
    OutOfRange {
        what: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// An entity does not belong to the expected parent scope
    #[error("{what} does not belong to guild {guild}")]
    WrongGuild { what: &'static str, guild: u64 },

    /// A malformed argument (bad snowflake, empty content, ...)
    #[error("{0}")]
    Malformed(String),
}

/// Result type for action construction and execution.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Machine-readable Discord JSON error codes.
///
/// Discord returns these in error bodies alongside the HTTP status; they are
/// stable across API versions and individually matchable. Codes this library
/// does not know about are preserved in [`ErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    GeneralError,
    UnknownAccount,
    UnknownApplication,
    UnknownChannel,
    UnknownGuild,
    UnknownInvite,
    UnknownMember,
    UnknownMessage,
    UnknownRole,
    UnknownUser,
    UnknownBan,
    BotsCannotUseEndpoint,
    MaxGuilds,
    Unauthorized,
    UserBanned,
    MissingAccess,
    CannotExecuteOnDm,
    MissingPermissions,
    InvalidToken,
    InvalidBulkDeleteCount,
    MessageTooOldForBulkDelete,
    InvalidFormBody,
    ReactionBlocked,
    /// A code this library does not have a named variant for
    Other(i32),
}

impl ErrorCode {
    /// Resolve a raw Discord error code.
    ///
    /// The lookup is a match over a small fixed set; unknown codes map to
    /// [`ErrorCode::Other`] rather than being dropped.
    #[must_use]
    pub const fn from_code(raw: i32) -> Self {
        match raw {
            0 => Self::GeneralError,
            10_001 => Self::UnknownAccount,
            10_002 => Self::UnknownApplication,
            10_003 => Self::UnknownChannel,
            10_004 => Self::UnknownGuild,
            10_006 => Self::UnknownInvite,
            10_007 => Self::UnknownMember,
            10_008 => Self::UnknownMessage,
            10_011 => Self::UnknownRole,
            10_013 => Self::UnknownUser,
            10_026 => Self::UnknownBan,
            20_001 => Self::BotsCannotUseEndpoint,
            30_001 => Self::MaxGuilds,
            40_001 => Self::Unauthorized,
            40_007 => Self::UserBanned,
            50_001 => Self::MissingAccess,
            50_003 => Self::CannotExecuteOnDm,
            50_013 => Self::MissingPermissions,
            50_014 => Self::InvalidToken,
            50_016 => Self::InvalidBulkDeleteCount,
            50_034 => Self::MessageTooOldForBulkDelete,
            50_035 => Self::InvalidFormBody,
            90_001 => Self::ReactionBlocked,
            other => Self::Other(other),
        }
    }

    /// Get the raw numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::GeneralError => 0,
            Self::UnknownAccount => 10_001,
            Self::UnknownApplication => 10_002,
            Self::UnknownChannel => 10_003,
            Self::UnknownGuild => 10_004,
            Self::UnknownInvite => 10_006,
            Self::UnknownMember => 10_007,
            Self::UnknownMessage => 10_008,
            Self::UnknownRole => 10_011,
            Self::UnknownUser => 10_013,
            Self::UnknownBan => 10_026,
            Self::BotsCannotUseEndpoint => 20_001,
            Self::MaxGuilds => 30_001,
            Self::Unauthorized => 40_001,
            Self::UserBanned => 40_007,
            Self::MissingAccess => 50_001,
            Self::CannotExecuteOnDm => 50_003,
            Self::MissingPermissions => 50_013,
            Self::InvalidToken => 50_014,
            Self::InvalidBulkDeleteCount => 50_016,
            Self::MessageTooOldForBulkDelete => 50_034,
            Self::InvalidFormBody => 50_035,
            Self::ReactionBlocked => 90_001,
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_round_trips_known_values() {
        assert_eq!(ErrorCode::from_code(10_007), ErrorCode::UnknownMember);
        assert_eq!(ErrorCode::from_code(50_013), ErrorCode::MissingPermissions);
        assert_eq!(ErrorCode::UnknownMember.code(), 10_007);
    }

    #[test]
    fn unrecognized_codes_are_preserved() {
        let code = ErrorCode::from_code(123_456);
        assert_eq!(code, ErrorCode::Other(123_456));
        assert_eq!(code.code(), 123_456);
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = Error::Response {
            status: 502,
            code: ErrorCode::GeneralError,
            message: "bad gateway".into(),
        };
        assert!(err.is_retryable());

        let err = Error::Response {
            status: 403,
            code: ErrorCode::MissingPermissions,
            message: "missing permissions".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn rate_limit_exposes_retry_after() {
        let err = Error::RateLimited { retry_after: 1.5 };
        assert_eq!(err.retry_after(), Some(Duration::from_secs_f64(1.5)));
        assert!(err.is_retryable());
    }
}
