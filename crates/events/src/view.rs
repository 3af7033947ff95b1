//! View-shaped projections handed to the presentation layer.
//!
//! Stores return `*Record`/`EventListing` rows with raw timestamps; the
//! conversions here render every date with the shared format.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use homies_core::{EventId, format_date_time};

/// Listing row as produced by a store query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListing {
    pub id: EventId,
    pub name: String,
    pub start: NaiveDateTime,
    pub type_name: String,
    pub organiser_name: String,
}

/// Event card used by the "all events" and "joined events" lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: EventId,
    pub name: String,
    pub start: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub organiser: String,
}

impl From<EventListing> for EventSummary {
    fn from(row: EventListing) -> Self {
        Self {
            id: row.id,
            name: row.name,
            start: format_date_time(&row.start),
            type_name: row.type_name,
            organiser: row.organiser_name,
        }
    }
}

/// Detail row as produced by a store query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetailRecord {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub created_on: DateTime<Utc>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub type_name: String,
    pub organiser_name: String,
}

/// Full event page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub created_on: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub organiser: String,
    /// Whether the viewing user currently participates.
    pub joined: bool,
}

impl EventDetail {
    pub fn new(row: EventDetailRecord, joined: bool) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_on: format_date_time(&row.created_on.naive_utc()),
            start: format_date_time(&row.start),
            end: format_date_time(&row.end),
            type_name: row.type_name,
            organiser: row.organiser_name,
            joined,
        }
    }
}
