//! CLI configuration.
//!
//! Settings live in `~/.config/caldav/config.toml` by default:
//!
//! ```toml
//! [server]
//! url = "https://dav.example.com/calendars/alice/work/"
//! username = "alice"
//! password = "pass::dav/alice"
//! timeout = 30
//! ```
//!
//! Command-line flags and `CALDAV_*` environment variables take precedence
//! over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use caldav_client::CalDavConfig;
use serde::{Deserialize, Serialize};

use crate::cli::ConnectionArgs;
use crate::error::{CliError, CliResult};
use crate::secret;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Debug mode.
    pub debug: bool,

    /// Server/connection settings.
    pub server: ServerSettings,
}

/// Connection settings for the CalDAV server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub url: Option<String>,

    pub username: Option<String>,

    /// Password (supports `pass::` and `env::` prefixes).
    pub password: Option<String>,

    pub proxy: Option<String>,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            proxy: None,
            timeout: CalDavConfig::DEFAULT_TIMEOUT_SECS,
            insecure: false,
        }
    }
}

impl CliConfig {
    /// Loads the default file, or defaults when it does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("caldav")
            .join("config.toml")
    }
}

impl ServerSettings {
    /// Applies command-line overrides on top of the file settings.
    pub fn merged(&self, args: &ConnectionArgs) -> Self {
        Self {
            url: args.url.clone().or_else(|| self.url.clone()),
            username: args.user.clone().or_else(|| self.username.clone()),
            password: args.password.clone().or_else(|| self.password.clone()),
            proxy: args.proxy.clone().or_else(|| self.proxy.clone()),
            timeout: args.timeout.unwrap_or(self.timeout),
            insecure: args.insecure || self.insecure,
        }
    }

    /// Builds the client configuration, resolving secret references.
    pub fn to_client_config(&self) -> CliResult<CalDavConfig> {
        let url = self.url.as_deref().ok_or_else(|| {
            CliError::Config("no server url; set [server] url or pass --url".to_string())
        })?;

        let mut config = CalDavConfig::new(url)
            .map_err(|e| CliError::Config(format!("invalid server url {}: {}", url, e)))?
            .with_timeout(Duration::from_secs(self.timeout));

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                let username = secret::resolve(username).map_err(CliError::Config)?;
                let password = secret::resolve(password).map_err(CliError::Config)?;
                config = config.with_credentials(username, password);
            }
            (Some(username), None) => {
                let username = secret::resolve(username).map_err(CliError::Config)?;
                config = config.with_credentials(username, "");
            }
            (None, Some(_)) => {
                return Err(CliError::Config(
                    "a password is configured without a username".to_string(),
                ));
            }
            (None, None) => {}
        }

        if let Some(ref proxy) = self.proxy {
            config = config.with_proxy(proxy.clone());
        }
        if self.insecure {
            config = config.with_insecure_tls();
        }
        Ok(config)
    }
}
