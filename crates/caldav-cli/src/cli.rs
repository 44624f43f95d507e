//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// caldav - talk to a CalDAV server from the command line
#[derive(Debug, Parser)]
#[command(name = "caldav")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALDAV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection flags; each one overrides the `[server]` table of the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Base URL of the calendar server or collection
    #[arg(long, env = "CALDAV_URL", global = true)]
    pub url: Option<String>,

    /// Username for basic authentication
    #[arg(long, env = "CALDAV_USER", global = true)]
    pub user: Option<String>,

    /// Password (supports `env::` and `pass::` references)
    #[arg(long, env = "CALDAV_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Proxy address, e.g. http://proxy:3128
    #[arg(long, env = "CALDAV_PROXY", global = true)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,
}

/// Available commands.
///
/// `TARGET` arguments are resolved against the base URL; when omitted the
/// base URL itself is used.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up the current user's principal
    Principal { target: Option<String> },

    /// Look up the calendar home set of a principal
    HomeSet { target: Option<String> },

    /// List collections under a calendar home set
    Calendars {
        target: Option<String>,

        /// Print only calendar collections in a condensed form
        #[arg(long)]
        summary: bool,
    },

    /// Walk principal, home set and calendar listing from the base URL
    Discover,

    /// Search the base calendar for events by property value
    Search {
        /// Value to match
        id: String,

        /// Event property to filter on
        #[arg(long, default_value = "UID")]
        field: String,

        /// Print href, etag and calendar data instead of the raw multistatus
        #[arg(long)]
        events: bool,
    },

    /// Create or replace an event
    Put {
        /// Resource path, relative to the base URL
        path: String,

        /// iCalendar file to upload (`-` for stdin)
        #[arg(long, short)]
        file: PathBuf,

        /// Only replace the event if it still has this etag
        #[arg(long)]
        etag: Option<String>,
    },

    /// Delete an event that still has the given etag
    Delete {
        /// Resource path, relative to the base URL
        path: String,

        #[arg(long)]
        etag: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
