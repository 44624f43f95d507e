//! Core types: WebDAV multistatus model, calendar collections, tracing setup

pub mod model;
pub mod tracing;

pub use model::{
    CalendarCollection, CalendarObject, Component, ComponentSet, Href, MultiStatus, Prop,
    PropStat, ResourceType, Response, parse_status_code,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
