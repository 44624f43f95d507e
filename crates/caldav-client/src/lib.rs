//! CalDAV protocol client.
//!
//! This crate maps CalDAV interactions onto HTTP requests and decodes the
//! answers into the [`caldav_core`] multistatus model:
//!
//! - [`CalDavClient`] - one value holding the connection parameters and
//!   exposing all six operations
//! - [`discovery`] - stateless discovery functions taking parameters per call
//! - [`xml`] - request bodies and the generic XML element reader
//! - [`decode_multistatus`] - validated mapping from XML to [`MultiStatus`]
//!
//! # Architecture
//!
//! ```text
//!  request builder ──► reqwest ──► XML tree ──► MultiStatus
//!   (xml.rs)          (client.rs)  (xml.rs)     (decode.rs)
//!                          │
//!                          └──► PUT / DELETE status ──► etag / MultiStatus
//! ```
//!
//! # Example
//!
//! ```ignore
//! use caldav_client::{CalDavClient, CalDavConfig};
//!
//! let config = CalDavConfig::new("https://caldav.example.com/calendars/alice/work/")?
//!     .with_credentials("alice", "secret");
//! let client = CalDavClient::new(config)?;
//!
//! let found = client.search("UID", "event-1@example.com").await?;
//! for event in found.events() {
//!     let etag = event.etag.as_deref().unwrap_or_default();
//!     client.delete(&event.href, etag).await?;
//! }
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod xml;

pub use caldav_core::{
    CalendarCollection, CalendarObject, Component, ComponentSet, Href, MultiStatus, Prop,
    PropStat, ResourceType, Response,
};
pub use client::CalDavClient;
pub use config::CalDavConfig;
pub use decode::decode_multistatus;
pub use discovery::{get_calendar_component_set, get_calendar_home_set, get_current_user_principal};
pub use error::{CalDavError, CalDavErrorCode, CalDavResult};
