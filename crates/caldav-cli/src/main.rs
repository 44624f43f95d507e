//! caldav CLI entry point.

use std::process::ExitCode;

use caldav_cli::cli::{Cli, Command, ConfigAction};
use caldav_cli::commands;
use caldav_cli::config::CliConfig;
use caldav_cli::error::CliResult;
use caldav_client::CalDavClient;
use caldav_core::{TracingConfig, init_tracing};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let config = if cli.config.is_some() {
        CliConfig::load_from(&config_path)?
    } else {
        CliConfig::load()?
    };

    let tracing_config = if cli.debug || config.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    let settings = config.server.merged(&cli.connection);
    let command = match cli.command {
        Command::Config { action } => {
            return match action {
                ConfigAction::Dump => commands::config::dump(&config, &config_path),
                ConfigAction::Validate => commands::config::validate(&settings),
                ConfigAction::Path => commands::config::path(&config_path),
            };
        }
        command => command,
    };

    let client = CalDavClient::new(settings.to_client_config()?)?;

    match command {
        Command::Principal { target } => commands::dav::principal(&client, target.as_deref()).await,
        Command::HomeSet { target } => commands::dav::home_set(&client, target.as_deref()).await,
        Command::Calendars { target, summary } => {
            commands::dav::calendars(&client, target.as_deref(), summary).await
        }
        Command::Discover => commands::dav::discover(&client).await,
        Command::Search { id, field, events } => {
            commands::dav::search(&client, &field, &id, events).await
        }
        Command::Put { path, file, etag } => {
            commands::dav::put(&client, &path, &file, etag.as_deref()).await
        }
        Command::Delete { path, etag } => commands::dav::delete(&client, &path, &etag).await,
        Command::Config { .. } => Ok(()),
    }
}
