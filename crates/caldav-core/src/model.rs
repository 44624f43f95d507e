//! WebDAV multistatus model as used by CalDAV discovery and queries.
//!
//! Every PROPFIND and REPORT response is decoded into a [`MultiStatus`]. The
//! types here mirror the XML shape (`multistatus` > `response` > `propstat` >
//! `prop`) but only carry the properties a CalDAV client asks for. A missing
//! property field means the server did not return it; failures are reported
//! through the enclosing [`PropStat::status`] instead.

use serde::Serialize;

/// Decoded body of a `207 Multi-Status` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MultiStatus {
    /// Per-resource results, in server order.
    pub responses: Vec<Response>,
}

/// One resource's entry within a [`MultiStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Response {
    /// Path or URL of the resource.
    pub href: String,
    /// Status line, used by the short form that carries no propstat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Property groups with their fetch outcome.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub propstats: Vec<PropStat>,
}

/// A group of properties sharing one fetch outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropStat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop: Option<Prop>,
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

/// The properties this client knows how to read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prop {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user_principal: Option<Href>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_home_set: Option<Href>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Collection change tag (`getctag`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_calendar_component_set: Option<ComponentSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Raw iCalendar text of a calendar object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_color: Option<String>,
}

/// Wrapper around a single `href` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Href {
    pub href: String,
}

impl Href {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Calendar component types a collection accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentSet {
    pub components: Vec<Component>,
}

impl ComponentSet {
    /// Returns true if the set lists `name` (compared case-insensitively).
    pub fn supports(&self, name: &str) -> bool {
        self.components
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Component names in server order.
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A single component entry, e.g. `VEVENT` or `VTODO`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Component {
    pub name: String,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Contents of the `resourcetype` property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    pub collection: bool,
    pub calendar: bool,
    pub principal: bool,
    /// Local names of any other markers (e.g. `schedule-inbox`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

/// A calendar collection found during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCollection {
    pub href: String,
    pub display_name: Option<String>,
    pub ctag: Option<String>,
    /// Supported component names; empty when the server did not say.
    pub components: Vec<String>,
}

/// A calendar object resource returned by a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarObject {
    pub href: String,
    pub etag: Option<String>,
    pub calendar_data: String,
}

/// Extracts the numeric code from an HTTP status line.
///
/// `"HTTP/1.1 404 Not Found"` yields `Some(404)`.
pub fn parse_status_code(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}

impl PropStat {
    pub fn status_code(&self) -> Option<u16> {
        parse_status_code(&self.status)
    }

    /// Returns true for a 2xx status line.
    pub fn is_success(&self) -> bool {
        self.status_code().is_some_and(|c| (200..300).contains(&c))
    }
}

impl Response {
    /// Status code of the short form, if present.
    pub fn status_code(&self) -> Option<u16> {
        self.status.as_deref().and_then(parse_status_code)
    }

    /// Properties from propstats that reported success.
    pub fn ok_props(&self) -> impl Iterator<Item = &Prop> {
        self.propstats
            .iter()
            .filter(|ps| ps.is_success())
            .filter_map(|ps| ps.prop.as_ref())
    }

    fn is_calendar(&self) -> bool {
        self.ok_props()
            .any(|p| p.resource_type.as_ref().is_some_and(|rt| rt.calendar))
    }
}

impl MultiStatus {
    pub fn new(responses: Vec<Response>) -> Self {
        Self { responses }
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// First `current-user-principal` href reported with success.
    pub fn current_user_principal(&self) -> Option<&str> {
        self.responses
            .iter()
            .flat_map(|r| r.ok_props())
            .find_map(|p| p.current_user_principal.as_ref())
            .map(|h| h.href.as_str())
    }

    /// First `calendar-home-set` href reported with success.
    pub fn calendar_home_set(&self) -> Option<&str> {
        self.responses
            .iter()
            .flat_map(|r| r.ok_props())
            .find_map(|p| p.calendar_home_set.as_ref())
            .map(|h| h.href.as_str())
    }

    /// Calendar collections listed in an enumeration response.
    ///
    /// Resources whose `resourcetype` lacks `calendar` (the home collection
    /// itself, inboxes, plain folders) are skipped.
    pub fn calendars(&self) -> Vec<CalendarCollection> {
        self.responses
            .iter()
            .filter(|r| r.is_calendar())
            .map(|r| CalendarCollection {
                href: r.href.clone(),
                display_name: r.ok_props().find_map(|p| p.display_name.clone()),
                ctag: r.ok_props().find_map(|p| p.ctag.clone()),
                components: r
                    .ok_props()
                    .find_map(|p| p.supported_calendar_component_set.as_ref())
                    .map(|set| set.names().into_iter().map(str::to_string).collect())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Calendar objects carrying `calendar-data`, as returned by a search.
    pub fn events(&self) -> Vec<CalendarObject> {
        self.responses
            .iter()
            .filter_map(|r| {
                let data = r.ok_props().find_map(|p| p.calendar_data.clone())?;
                Some(CalendarObject {
                    href: r.href.clone(),
                    etag: r.ok_props().find_map(|p| p.etag.clone()),
                    calendar_data: data,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(prop: Prop) -> PropStat {
        PropStat {
            prop: Some(prop),
            status: "HTTP/1.1 200 OK".to_string(),
        }
    }

    fn calendar_type() -> ResourceType {
        ResourceType {
            collection: true,
            calendar: true,
            ..Default::default()
        }
    }

    #[test]
    fn status_line_parsing() {
        assert_eq!(parse_status_code("HTTP/1.1 200 OK"), Some(200));
        assert_eq!(parse_status_code("HTTP/1.1 404 Not Found"), Some(404));
        assert_eq!(parse_status_code("garbage"), None);
        assert_eq!(parse_status_code(""), None);
    }

    #[test]
    fn propstat_success() {
        assert!(ok(Prop::default()).is_success());
        let failed = PropStat {
            prop: None,
            status: "HTTP/1.1 404 Not Found".to_string(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.status_code(), Some(404));
    }

    #[test]
    fn principal_skips_failed_propstats() {
        let ms = MultiStatus::new(vec![Response {
            href: "/".to_string(),
            status: None,
            propstats: vec![
                PropStat {
                    prop: Some(Prop {
                        current_user_principal: Some(Href::new("/wrong/")),
                        ..Default::default()
                    }),
                    status: "HTTP/1.1 403 Forbidden".to_string(),
                },
                ok(Prop {
                    current_user_principal: Some(Href::new("/principals/alice/")),
                    ..Default::default()
                }),
            ],
        }]);

        assert_eq!(ms.current_user_principal(), Some("/principals/alice/"));
        assert_eq!(ms.calendar_home_set(), None);
    }

    #[test]
    fn calendars_filters_non_calendar_collections() {
        let ms = MultiStatus::new(vec![
            Response {
                href: "/calendars/alice/".to_string(),
                status: None,
                propstats: vec![ok(Prop {
                    resource_type: Some(ResourceType {
                        collection: true,
                        ..Default::default()
                    }),
                    ..Default::default()
                })],
            },
            Response {
                href: "/calendars/alice/work/".to_string(),
                status: None,
                propstats: vec![ok(Prop {
                    resource_type: Some(calendar_type()),
                    display_name: Some("Work".to_string()),
                    ctag: Some("ctag-1".to_string()),
                    supported_calendar_component_set: Some(ComponentSet {
                        components: vec![Component::new("VEVENT"), Component::new("VTODO")],
                    }),
                    ..Default::default()
                })],
            },
        ]);

        let calendars = ms.calendars();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].href, "/calendars/alice/work/");
        assert_eq!(calendars[0].display_name.as_deref(), Some("Work"));
        assert_eq!(calendars[0].ctag.as_deref(), Some("ctag-1"));
        assert_eq!(calendars[0].components, vec!["VEVENT", "VTODO"]);
    }

    #[test]
    fn events_requires_calendar_data() {
        let ms = MultiStatus::new(vec![
            Response {
                href: "/cal/a.ics".to_string(),
                status: None,
                propstats: vec![ok(Prop {
                    etag: Some("\"1\"".to_string()),
                    calendar_data: Some("BEGIN:VCALENDAR".to_string()),
                    ..Default::default()
                })],
            },
            Response {
                href: "/cal/b.ics".to_string(),
                status: Some("HTTP/1.1 404 Not Found".to_string()),
                propstats: vec![],
            },
        ]);

        let events = ms.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].href, "/cal/a.ics");
        assert_eq!(events[0].etag.as_deref(), Some("\"1\""));
        assert_eq!(ms.responses()[1].status_code(), Some(404));
    }

    #[test]
    fn component_set_is_case_insensitive() {
        let set = ComponentSet {
            components: vec![Component::new("VEVENT")],
        };
        assert!(set.supports("vevent"));
        assert!(!set.supports("VTODO"));
    }

    #[test]
    fn serializes_without_empty_fields() {
        let ms = MultiStatus::new(vec![Response {
            href: "/principals/alice/".to_string(),
            status: Some("HTTP/1.1 200 OK".to_string()),
            propstats: vec![],
        }]);

        insta::assert_json_snapshot!(ms, @r#"
        {
          "responses": [
            {
              "href": "/principals/alice/",
              "status": "HTTP/1.1 200 OK"
            }
          ]
        }
        "#);
    }
}
