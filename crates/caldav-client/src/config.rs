//! Connection parameters for a CalDAV client.

use std::time::Duration;
use url::Url;

/// Immutable connection settings held by a [`crate::CalDavClient`].
#[derive(Debug, Clone)]
pub struct CalDavConfig {
    /// Base URL. Relative resource paths are resolved against it, and
    /// calendar searches are issued against it.
    pub url: Url,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Proxy address applied to every request (e.g. `http://proxy:3128`).
    pub proxy: Option<String>,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// Per-request timeout.
    pub timeout: Duration,

    pub user_agent: String,
}

impl CalDavConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref())?;
        Ok(Self {
            url: parsed,
            username: None,
            password: None,
            proxy: None,
            verify_tls: true,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("caldav-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Disables TLS verification (for testing only).
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the base URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Resolves `target` against the base URL.
    ///
    /// Absolute URLs are returned unchanged, absolute paths replace the base
    /// path, and relative paths are appended to the base collection.
    pub fn resolve(&self, target: &str) -> Result<Url, url::ParseError> {
        self.url.join(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_creation() {
        let config = CalDavConfig::new("https://caldav.example.com/calendars/alice/").unwrap();
        assert_eq!(
            config.url_str(),
            "https://caldav.example.com/calendars/alice/"
        );
        assert!(config.username.is_none());
        assert!(config.proxy.is_none());
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("caldav-client/"));
    }

    #[test]
    fn config_builder_methods() {
        let config = CalDavConfig::new("https://caldav.example.com/")
            .unwrap()
            .with_credentials("alice", "secret")
            .with_proxy("http://proxy.local:3128")
            .with_insecure_tls()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent");

        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert!(!config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn resolve_targets() {
        let config = CalDavConfig::new("https://caldav.example.com/calendars/alice/work/").unwrap();

        assert_eq!(
            config.resolve("event-1.ics").unwrap().as_str(),
            "https://caldav.example.com/calendars/alice/work/event-1.ics"
        );
        assert_eq!(
            config.resolve("/principals/alice/").unwrap().as_str(),
            "https://caldav.example.com/principals/alice/"
        );
        assert_eq!(
            config.resolve("https://other.example.com/cal/").unwrap().as_str(),
            "https://other.example.com/cal/"
        );
    }

    #[test]
    fn invalid_url_returns_error() {
        assert!(CalDavConfig::new("not a valid url").is_err());
    }
}
