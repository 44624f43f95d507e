//! Stateless discovery helpers.
//!
//! Each function takes the connection parameters for a single call, builds a
//! short-lived [`CalDavClient`] around them and runs one discovery request.
//! Code that issues several requests against the same server should keep a
//! client instead.

use caldav_core::MultiStatus;

use crate::client::CalDavClient;
use crate::config::CalDavConfig;
use crate::error::CalDavResult;

fn one_shot(
    url: &str,
    user: &str,
    password: &str,
    proxy: Option<&str>,
) -> CalDavResult<CalDavClient> {
    let mut config = CalDavConfig::new(url)?.with_credentials(user, password);
    if let Some(proxy) = proxy {
        config = config.with_proxy(proxy);
    }
    CalDavClient::new(config)
}

/// Resolves the principal of `user` at `url` (PROPFIND, Depth 0).
pub async fn get_current_user_principal(
    url: &str,
    user: &str,
    password: &str,
    proxy: Option<&str>,
) -> CalDavResult<MultiStatus> {
    one_shot(url, user, password, proxy)?
        .current_user_principal(url)
        .await
}

/// Resolves the calendar home set of the principal at `url`.
pub async fn get_calendar_home_set(
    url: &str,
    user: &str,
    password: &str,
    proxy: Option<&str>,
) -> CalDavResult<MultiStatus> {
    one_shot(url, user, password, proxy)?
        .calendar_home_set(url)
        .await
}

/// Lists the calendars under the home set at `url`.
pub async fn get_calendar_component_set(
    url: &str,
    user: &str,
    password: &str,
    proxy: Option<&str>,
) -> CalDavResult<MultiStatus> {
    one_shot(url, user, password, proxy)?
        .calendar_component_set(url)
        .await
}
