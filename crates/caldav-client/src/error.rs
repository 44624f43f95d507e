//! Error types for CalDAV operations.
//!
//! Every public operation returns [`CalDavResult`]. Per-resource failures
//! inside a multistatus body are not errors; they stay in the decoded
//! [`caldav_core::MultiStatus`] for the caller to inspect.

use std::fmt;
use thiserror::Error;

/// High-level classification of a [`CalDavError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalDavErrorCode {
    /// Connection failure, timeout, DNS resolution, TLS, etc.
    Transport,
    /// The response body was not the expected XML shape.
    Decode,
    /// PUT or DELETE was answered with a non-2xx status.
    Mutation,
    /// PROPFIND or REPORT was answered with a non-2xx status.
    UnexpectedStatus,
    InvalidUrl,
    /// The caller broke an argument contract (e.g. empty etag on DELETE).
    InvalidArgument,
    Configuration,
}

impl CalDavErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport_error",
            Self::Decode => "decode_error",
            Self::Mutation => "mutation_error",
            Self::UnexpectedStatus => "unexpected_status",
            Self::InvalidUrl => "invalid_url",
            Self::InvalidArgument => "invalid_argument",
            Self::Configuration => "configuration_error",
        }
    }
}

impl fmt::Display for CalDavErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by a CalDAV operation.
#[derive(Debug, Error)]
pub enum CalDavError {
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("server rejected the change with status {status}")]
    Mutation { status: u16, body: String },

    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CalDavError {
    pub(crate) fn transport(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn code(&self) -> CalDavErrorCode {
        match self {
            Self::Transport { .. } => CalDavErrorCode::Transport,
            Self::Decode(_) => CalDavErrorCode::Decode,
            Self::Mutation { .. } => CalDavErrorCode::Mutation,
            Self::UnexpectedStatus { .. } => CalDavErrorCode::UnexpectedStatus,
            Self::InvalidUrl(_) => CalDavErrorCode::InvalidUrl,
            Self::InvalidArgument(_) => CalDavErrorCode::InvalidArgument,
            Self::Configuration(_) => CalDavErrorCode::Configuration,
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Mutation { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Mutation { body, .. } | Self::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true for a 412 Precondition Failed, i.e. a stale `If-Match` etag.
    pub fn is_precondition_failed(&self) -> bool {
        self.status() == Some(412)
    }
}

/// A specialized Result type for CalDAV operations.
pub type CalDavResult<T> = Result<T, CalDavError>;
