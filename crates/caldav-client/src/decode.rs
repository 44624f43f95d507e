//! Maps a decoded XML tree onto the multistatus model.
//!
//! The tree is checked structurally on the way: a missing `multistatus`
//! element, a `response` without `href`, or a `propstat` without `status`
//! is reported as [`CalDavError::Decode`] instead of yielding a partial value.

use caldav_core::{Component, ComponentSet, Href, MultiStatus, Prop, PropStat, ResourceType, Response};

use crate::error::{CalDavError, CalDavResult};
use crate::xml::{XmlElement, parse_element_tree};

/// Decodes a multistatus response body.
///
/// The `multistatus` element is normally the document root; it is also
/// accepted when nested inside some other wrapper element.
pub fn decode_multistatus(xml: &str) -> CalDavResult<MultiStatus> {
    let tree = parse_element_tree(xml)?;
    let multistatus = tree.find("multistatus").ok_or_else(|| {
        CalDavError::decode(format!(
            "expected a multistatus element, found <{}>",
            tree.name
        ))
    })?;
    multistatus_from_element(multistatus)
}

/// Decodes a body that may or may not be a multistatus document.
///
/// Returns `Ok(None)` when the body is not XML or has no `multistatus`
/// element. A `multistatus` that fails validation is still an error.
pub fn decode_multistatus_if_present(xml: &str) -> CalDavResult<Option<MultiStatus>> {
    let Ok(tree) = parse_element_tree(xml) else {
        return Ok(None);
    };
    tree.find("multistatus")
        .map(multistatus_from_element)
        .transpose()
}

fn multistatus_from_element(element: &XmlElement) -> CalDavResult<MultiStatus> {
    let responses = element
        .children_named("response")
        .map(response_from_element)
        .collect::<CalDavResult<Vec<_>>>()?;
    Ok(MultiStatus::new(responses))
}

fn response_from_element(element: &XmlElement) -> CalDavResult<Response> {
    let href = element
        .child("href")
        .map(|h| h.trimmed_text().to_string())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CalDavError::decode("response element without href"))?;

    let status = element
        .child("status")
        .map(|s| s.trimmed_text().to_string());

    let propstats = element
        .children_named("propstat")
        .map(|ps| propstat_from_element(ps, &href))
        .collect::<CalDavResult<Vec<_>>>()?;

    if propstats.is_empty() && status.is_none() {
        return Err(CalDavError::decode(format!(
            "response for {} has neither propstat nor status",
            href
        )));
    }

    Ok(Response {
        href,
        status,
        propstats,
    })
}

fn propstat_from_element(element: &XmlElement, href: &str) -> CalDavResult<PropStat> {
    let status = element
        .child("status")
        .map(|s| s.trimmed_text().to_string())
        .ok_or_else(|| CalDavError::decode(format!("propstat for {} without status", href)))?;

    Ok(PropStat {
        prop: element.child("prop").map(prop_from_element),
        status,
    })
}

fn prop_from_element(element: &XmlElement) -> Prop {
    let mut prop = Prop::default();
    for child in &element.children {
        match child.name.as_str() {
            "current-user-principal" => prop.current_user_principal = href_from(child),
            "calendar-home-set" => prop.calendar_home_set = href_from(child),
            "displayname" => prop.display_name = Some(text_of(child)),
            "getctag" => prop.ctag = Some(text_of(child)),
            "getetag" => prop.etag = Some(text_of(child)),
            "calendar-data" => prop.calendar_data = Some(child.text.clone()),
            "calendar-description" => prop.calendar_description = Some(text_of(child)),
            "calendar-color" => prop.calendar_color = Some(text_of(child)),
            "supported-calendar-component-set" => {
                prop.supported_calendar_component_set = Some(component_set_from(child))
            }
            "resourcetype" => prop.resource_type = Some(resource_type_from(child)),
            _ => {}
        }
    }
    prop
}

fn text_of(element: &XmlElement) -> String {
    element.trimmed_text().to_string()
}

/// Reads the nested `href`; `None` for markers such as `<unauthenticated/>`.
fn href_from(element: &XmlElement) -> Option<Href> {
    element
        .child("href")
        .map(|h| Href::new(h.trimmed_text()))
        .filter(|h| !h.href.is_empty())
}

fn component_set_from(element: &XmlElement) -> ComponentSet {
    ComponentSet {
        components: element
            .children_named("comp")
            .filter_map(|c| c.attribute("name"))
            .map(Component::new)
            .collect(),
    }
}

fn resource_type_from(element: &XmlElement) -> ResourceType {
    let mut resource_type = ResourceType::default();
    for marker in &element.children {
        match marker.name.as_str() {
            "collection" => resource_type.collection = true,
            "calendar" => resource_type.calendar = true,
            "principal" => resource_type.principal = true,
            other => resource_type.other.push(other.to_string()),
        }
    }
    resource_type
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_response_normalizes_to_one_element() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/</d:href>
    <d:propstat>
      <d:prop>
        <d:current-user-principal><d:href>/principals/alice/</d:href></d:current-user-principal>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = decode_multistatus(xml).unwrap();
        assert_eq!(ms.responses.len(), 1);
        assert_eq!(ms.responses[0].href, "/");
        assert_eq!(ms.current_user_principal(), Some("/principals/alice/"));
    }

    #[test]
    fn multiple_responses_keep_server_order() {
        let xml = r#"<multistatus xmlns="DAV:">
  <response><href>/c/</href><status>HTTP/1.1 200 OK</status></response>
  <response><href>/a/</href><status>HTTP/1.1 200 OK</status></response>
  <response><href>/b/</href><status>HTTP/1.1 404 Not Found</status></response>
</multistatus>"#;

        let ms = decode_multistatus(xml).unwrap();
        let hrefs: Vec<_> = ms.responses.iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/c/", "/a/", "/b/"]);
        assert_eq!(ms.responses[2].status_code(), Some(404));
        assert!(ms.responses[0].propstats.is_empty());
    }

    #[test]
    fn calendar_listing_properties() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav" xmlns:cs="http://calendarserver.org/ns/">
  <d:response>
    <d:href>/calendars/alice/</d:href>
    <d:propstat>
      <d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
    <d:propstat>
      <d:prop><cs:getctag/><cal:supported-calendar-component-set/></d:prop>
      <d:status>HTTP/1.1 404 Not Found</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/calendars/alice/work/</d:href>
    <d:propstat>
      <d:prop>
        <d:resourcetype><d:collection/><cal:calendar/><cs:shared-owner/></d:resourcetype>
        <d:displayname>Work &amp; Projects</d:displayname>
        <cs:getctag>"ctag-17"</cs:getctag>
        <cal:supported-calendar-component-set>
          <cal:comp name="VEVENT"/>
          <cal:comp name="VTODO"/>
        </cal:supported-calendar-component-set>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = decode_multistatus(xml).unwrap();
        assert_eq!(ms.responses.len(), 2);

        let home = &ms.responses[0];
        assert_eq!(home.propstats.len(), 2);
        assert!(!home.propstats[1].is_success());

        let work = ms.responses[1].propstats[0].prop.as_ref().unwrap();
        let rt = work.resource_type.as_ref().unwrap();
        assert!(rt.collection && rt.calendar && !rt.principal);
        assert_eq!(rt.other, vec!["shared-owner"]);
        assert_eq!(work.display_name.as_deref(), Some("Work & Projects"));
        assert_eq!(work.ctag.as_deref(), Some("\"ctag-17\""));
        let set = work.supported_calendar_component_set.as_ref().unwrap();
        assert_eq!(set.names(), vec!["VEVENT", "VTODO"]);

        let calendars = ms.calendars();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].href, "/calendars/alice/work/");
    }

    #[test]
    fn search_results_with_calendar_data() {
        let xml = r#"<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/calendars/alice/work/event-1.ics</d:href>
    <d:propstat>
      <d:prop>
        <d:getetag>"abc123"</d:getetag>
        <c:calendar-data>BEGIN:VCALENDAR
BEGIN:VEVENT
UID:event-1
END:VEVENT
END:VCALENDAR</c:calendar-data>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = decode_multistatus(xml).unwrap();
        let events = ms.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].etag.as_deref(), Some("\"abc123\""));
        assert!(events[0].calendar_data.contains("UID:event-1"));
        assert!(events[0].calendar_data.starts_with("BEGIN:VCALENDAR"));
    }

    #[test]
    fn home_set_and_unauthenticated_principal() {
        let xml = r#"<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/principals/alice/</d:href>
    <d:propstat>
      <d:prop>
        <c:calendar-home-set><d:href>/calendars/alice/</d:href></c:calendar-home-set>
        <d:current-user-principal><d:unauthenticated/></d:current-user-principal>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = decode_multistatus(xml).unwrap();
        assert_eq!(ms.calendar_home_set(), Some("/calendars/alice/"));
        assert_eq!(ms.current_user_principal(), None);
    }

    #[test]
    fn empty_multistatus_is_valid() {
        let ms = decode_multistatus(r#"<d:multistatus xmlns:d="DAV:"/>"#).unwrap();
        assert!(ms.is_empty());
    }

    #[test]
    fn missing_multistatus_is_an_error() {
        let err = decode_multistatus("<html><body>Login</body></html>").unwrap_err();
        assert!(err.to_string().contains("multistatus"));
    }

    #[test]
    fn structural_errors() {
        let no_href = r#"<multistatus xmlns="DAV:"><response><status>HTTP/1.1 200 OK</status></response></multistatus>"#;
        assert!(decode_multistatus(no_href).is_err());

        let no_propstat_status = r#"<multistatus xmlns="DAV:"><response><href>/a</href><propstat><prop/></propstat></response></multistatus>"#;
        assert!(decode_multistatus(no_propstat_status).is_err());

        let bare_response =
            r#"<multistatus xmlns="DAV:"><response><href>/a</href></response></multistatus>"#;
        assert!(decode_multistatus(bare_response).is_err());
    }

    #[test]
    fn unknown_properties_are_ignored() {
        let xml = r#"<multistatus xmlns="DAV:"><response><href>/a</href><propstat><prop><getlastmodified>Tue</getlastmodified><displayname>A</displayname></prop><status>HTTP/1.1 200 OK</status></propstat></response></multistatus>"#;
        let ms = decode_multistatus(xml).unwrap();
        let prop = ms.responses[0].propstats[0].prop.as_ref().unwrap();
        assert_eq!(prop.display_name.as_deref(), Some("A"));
        assert!(prop.etag.is_none());
    }

    #[test]
    fn optional_decode_skips_plain_bodies() {
        assert_eq!(decode_multistatus_if_present("Deleted").unwrap(), None);
        assert_eq!(
            decode_multistatus_if_present("<html><body/></html>").unwrap(),
            None
        );
    }

    #[test]
    fn optional_decode_still_validates_multistatus() {
        let ok = r#"<d:multistatus xmlns:d="DAV:"><d:response><d:href>/a.ics</d:href><d:status>HTTP/1.1 200 OK</d:status></d:response></d:multistatus>"#;
        let ms = decode_multistatus_if_present(ok).unwrap().unwrap();
        assert_eq!(ms.responses[0].href, "/a.ics");

        let missing_href = r#"<d:multistatus xmlns:d="DAV:"><d:response><d:status>HTTP/1.1 200 OK</d:status></d:response></d:multistatus>"#;
        assert!(decode_multistatus_if_present(missing_href).is_err());
    }
}
