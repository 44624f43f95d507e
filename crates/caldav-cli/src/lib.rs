//! Command-line front end for the CalDAV client
//!
//! This crate provides the `caldav` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{CliError, CliResult};
