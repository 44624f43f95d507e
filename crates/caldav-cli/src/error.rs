//! CLI error types.

use std::fmt;

use caldav_client::CalDavError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// A CalDAV operation failed.
    CalDav(CalDavError),
    /// The server answered, but not with what discovery needs.
    Discovery(String),
    /// IO error.
    Io(std::io::Error),
    /// Output could not be rendered.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::CalDav(err) => match err.body() {
                Some(body) if !body.trim().is_empty() => write!(f, "{}\n{}", err, body.trim()),
                _ => write!(f, "{}", err),
            },
            Self::Discovery(msg) => write!(f, "discovery failed: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CalDav(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CalDavError> for CliError {
    fn from(err: CalDavError) -> Self {
        Self::CalDav(err)
    }
}
