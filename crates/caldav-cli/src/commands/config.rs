//! Configuration commands.

use std::path::Path;

use crate::config::{CliConfig, ServerSettings};
use crate::error::{CliError, CliResult};
use crate::secret::SecretRef;

/// Dump the current configuration to stdout, masking literal passwords.
pub fn dump(config: &CliConfig, path: &Path) -> CliResult<()> {
    let mut shown = config.clone();
    let literal = shown
        .server
        .password
        .as_deref()
        .is_some_and(|p| matches!(SecretRef::parse(p), SecretRef::Plain(_)));
    if literal {
        shown.server.password = Some("********".to_string());
    }

    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the effective settings, including secret references.
pub fn validate(settings: &ServerSettings) -> CliResult<()> {
    let client_config = settings.to_client_config()?;
    caldav_client::CalDavClient::new(client_config)?;
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> CliResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
