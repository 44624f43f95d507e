//! XML request bodies and a generic element-tree reader for WebDAV traffic.
//!
//! Request bodies are written with `quick-xml`'s event writer, so caller
//! supplied values (search field and match text) are always escaped. Responses
//! are first read into an [`XmlElement`] tree; mapping that tree onto the
//! multistatus model happens in [`crate::decode`].

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{CalDavError, CalDavResult};

/// DAV namespace
pub const DAV_NS: &str = "DAV:";
/// CalDAV namespace
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";
/// CalendarServer namespace (for `getctag`)
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// Properties requested when enumerating calendars under a home set.
const CALENDAR_LISTING_PROPS: &[&str] = &[
    "d:resourcetype",
    "d:displayname",
    "cs:getctag",
    "c:supported-calendar-component-set",
];

/// Thin wrapper turning writer failures into [`CalDavError`]s.
struct BodyWriter {
    inner: Writer<Vec<u8>>,
}

impl BodyWriter {
    fn new() -> CalDavResult<Self> {
        let mut writer = Self {
            inner: Writer::new(Vec::new()),
        };
        writer.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(writer)
    }

    fn write(&mut self, event: Event<'_>) -> CalDavResult<()> {
        self.inner
            .write_event(event)
            .map_err(|e| CalDavError::Configuration(format!("failed to write XML body: {}", e)))
    }

    fn start(&mut self, element: BytesStart<'_>) -> CalDavResult<()> {
        self.write(Event::Start(element))
    }

    fn open(&mut self, name: &str) -> CalDavResult<()> {
        self.start(BytesStart::new(name))
    }

    fn close(&mut self, name: &str) -> CalDavResult<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str) -> CalDavResult<()> {
        self.write(Event::Empty(BytesStart::new(name)))
    }

    fn text(&mut self, text: &str) -> CalDavResult<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> CalDavResult<String> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|e| CalDavError::Configuration(format!("XML body is not UTF-8: {}", e)))
    }
}

/// Root element carrying the DAV, CalDAV and CalendarServer prefixes.
fn root(name: &str) -> BytesStart<'_> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("xmlns:d", DAV_NS));
    element.push_attribute(("xmlns:c", CALDAV_NS));
    element.push_attribute(("xmlns:cs", CS_NS));
    element
}

/// Builds a `<d:propfind>` body requesting the given prefixed property names.
///
/// Names must use the `d:`, `c:` or `cs:` prefixes declared on the root.
pub fn propfind_body(props: &[&str]) -> CalDavResult<String> {
    let mut w = BodyWriter::new()?;
    w.start(root("d:propfind"))?;
    w.open("d:prop")?;
    for prop in props {
        w.empty(prop)?;
    }
    w.close("d:prop")?;
    w.close("d:propfind")?;
    w.finish()
}

/// PROPFIND body for principal discovery.
pub fn current_user_principal_body() -> CalDavResult<String> {
    propfind_body(&["d:current-user-principal"])
}

/// PROPFIND body for calendar-home discovery.
pub fn calendar_home_set_body() -> CalDavResult<String> {
    propfind_body(&["c:calendar-home-set"])
}

/// PROPFIND body for listing calendars and their component sets.
pub fn calendar_component_set_body() -> CalDavResult<String> {
    propfind_body(CALENDAR_LISTING_PROPS)
}

/// Builds a `calendar-query` REPORT body matching VEVENTs whose `field`
/// property contains `id`.
///
/// Filter nesting is `VCALENDAR` > `VEVENT` > `prop-filter name=field` >
/// `text-match`. Both values are escaped by the writer.
pub fn calendar_query_body(field: &str, id: &str) -> CalDavResult<String> {
    let mut w = BodyWriter::new()?;
    w.start(root("c:calendar-query"))?;

    w.open("d:prop")?;
    w.empty("d:getetag")?;
    w.empty("c:calendar-data")?;
    w.close("d:prop")?;

    w.open("c:filter")?;
    let mut vcalendar = BytesStart::new("c:comp-filter");
    vcalendar.push_attribute(("name", "VCALENDAR"));
    w.start(vcalendar)?;
    let mut vevent = BytesStart::new("c:comp-filter");
    vevent.push_attribute(("name", "VEVENT"));
    w.start(vevent)?;
    let mut prop_filter = BytesStart::new("c:prop-filter");
    prop_filter.push_attribute(("name", field));
    w.start(prop_filter)?;
    w.open("c:text-match")?;
    w.text(id)?;
    w.close("c:text-match")?;
    w.close("c:prop-filter")?;
    w.close("c:comp-filter")?;
    w.close("c:comp-filter")?;
    w.close("c:filter")?;

    w.close("c:calendar-query")?;
    w.finish()
}

/// A generic XML element: local name, attributes, children and text.
///
/// Namespace prefixes are dropped from element and attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated text and CDATA content.
    pub text: String,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Depth-first search for `name`, starting with this element.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Text content with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// Reads an XML document into an element tree.
///
/// # Errors
///
/// Returns [`CalDavError::Decode`] for malformed XML or a document without a
/// root element.
pub fn parse_element_tree(xml: &str) -> CalDavResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            CalDavError::decode(format!(
                "malformed XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => stack.push(element_from_start(&e)?),
            Event::Empty(e) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| CalDavError::decode(format!("invalid text: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CalDavError::decode(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| CalDavError::decode("document has no root element"))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> CalDavResult<XmlElement> {
    let mut element = XmlElement::new(local_name(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CalDavError::decode(format!("invalid attribute: {}", e)))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| CalDavError::decode(format!("invalid attribute value: {}", e)))?;
        element
            .attributes
            .push((local_name(key), value.into_owned()));
    }
    Ok(element)
}

/// Extracts the local name from a potentially prefixed name.
fn local_name(name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    name.rsplit(':').next().unwrap_or(&name).to_string()
}
