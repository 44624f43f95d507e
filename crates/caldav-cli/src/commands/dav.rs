//! CalDAV commands.
//!
//! Each command maps onto one client operation and prints its result as JSON.
//! `discover` is the exception: it chains three operations.

use std::io::Read;
use std::path::Path;

use caldav_client::{CalDavClient, MultiStatus};
use serde::Serialize;
use tracing::info;

use crate::error::{CliError, CliResult};

/// Empty target: resolves to the base URL itself.
const BASE: &str = "";

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("failed to render JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

pub async fn principal(client: &CalDavClient, target: Option<&str>) -> CliResult<()> {
    let ms = client.current_user_principal(target.unwrap_or(BASE)).await?;
    print_json(&ms)
}

pub async fn home_set(client: &CalDavClient, target: Option<&str>) -> CliResult<()> {
    let ms = client.calendar_home_set(target.unwrap_or(BASE)).await?;
    print_json(&ms)
}

pub async fn calendars(client: &CalDavClient, target: Option<&str>, summary: bool) -> CliResult<()> {
    let ms = client.calendar_component_set(target.unwrap_or(BASE)).await?;
    if summary {
        print_json(&ms.calendars())
    } else {
        print_json(&ms)
    }
}

/// Follows principal -> calendar home set -> calendar listing.
pub async fn discover(client: &CalDavClient) -> CliResult<()> {
    let principal = required(
        &client.current_user_principal(BASE).await?,
        MultiStatus::current_user_principal,
        "server did not report a current-user-principal",
    )?;
    info!(principal = %principal, "Found principal");

    let home = required(
        &client.calendar_home_set(&principal).await?,
        MultiStatus::calendar_home_set,
        "principal has no calendar-home-set",
    )?;
    info!(home = %home, "Found calendar home set");

    let listing = client.calendar_component_set(&home).await?;
    print_json(&listing.calendars())
}

fn required(
    ms: &MultiStatus,
    pick: fn(&MultiStatus) -> Option<&str>,
    missing: &str,
) -> CliResult<String> {
    pick(ms)
        .map(str::to_string)
        .ok_or_else(|| CliError::Discovery(missing.to_string()))
}

pub async fn search(client: &CalDavClient, field: &str, id: &str, events: bool) -> CliResult<()> {
    let ms = client.search(field, id).await?;
    if events {
        print_json(&ms.events())
    } else {
        print_json(&ms)
    }
}

#[derive(Serialize)]
struct PutOutcome<'a> {
    href: &'a str,
    etag: Option<String>,
}

pub async fn put(
    client: &CalDavClient,
    path: &str,
    file: &Path,
    etag: Option<&str>,
) -> CliResult<()> {
    let body = read_event(file)?;
    let new_etag = client.put(path, body, etag).await?;
    print_json(&PutOutcome {
        href: path,
        etag: new_etag,
    })
}

pub async fn delete(client: &CalDavClient, path: &str, etag: &str) -> CliResult<()> {
    let ms = client.delete(path, etag).await?;
    print_json(&ms)
}

/// Reads the event body from a file, or stdin for `-`.
fn read_event(file: &Path) -> CliResult<String> {
    if file == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }
    std::fs::read_to_string(file)
        .map_err(|e| CliError::Config(format!("failed to read {}: {}", file.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use caldav_client::{Href, Prop, PropStat, Response};
    use std::io::Write;

    #[test]
    fn required_extracts_principal() {
        let ms = MultiStatus::new(vec![Response {
            href: "/".to_string(),
            status: None,
            propstats: vec![PropStat {
                prop: Some(Prop {
                    current_user_principal: Some(Href::new("/principals/alice/")),
                    ..Default::default()
                }),
                status: "HTTP/1.1 200 OK".to_string(),
            }],
        }]);

        let principal = required(&ms, MultiStatus::current_user_principal, "missing").unwrap();
        assert_eq!(principal, "/principals/alice/");

        let err = required(&ms, MultiStatus::calendar_home_set, "no home").unwrap_err();
        assert_eq!(err.to_string(), "discovery failed: no home");
    }

    #[test]
    fn read_event_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();
        let body = read_event(file.path()).unwrap();
        assert_eq!(body, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
    }

    #[test]
    fn read_event_missing_file() {
        let err = read_event(Path::new("/nonexistent/caldav/event.ics")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
