use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use homies_core::{Entity, EventId, TypeId, UserId};

/// Editable fields of an event, already validated.
///
/// Produced by [`crate::EventForm::validate`]; both create and update go
/// through the same type so they share one set of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub name: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub type_id: TypeId,
}

/// An event that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub organiser_id: UserId,
    pub created_on: DateTime<Utc>,
    pub details: EventDetails,
}

impl NewEvent {
    pub fn new(organiser_id: UserId, details: EventDetails, created_on: DateTime<Utc>) -> Self {
        Self {
            organiser_id,
            created_on,
            details,
        }
    }
}

/// Entity: Event.
///
/// `id`, `organiser_id` and `created_on` are fixed at creation; only the
/// [`EventDetails`] part can change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    organiser_id: UserId,
    created_on: DateTime<Utc>,
    details: EventDetails,
}

impl Event {
    /// Materialise a stored event under its system-assigned id.
    pub fn new(id: EventId, new: NewEvent) -> Self {
        Self {
            id,
            organiser_id: new.organiser_id,
            created_on: new.created_on,
            details: new.details,
        }
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn description(&self) -> &str {
        &self.details.description
    }

    pub fn organiser_id(&self) -> &UserId {
        &self.organiser_id
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn start(&self) -> NaiveDateTime {
        self.details.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.details.end
    }

    pub fn type_id(&self) -> TypeId {
        self.details.type_id
    }

    pub fn details(&self) -> &EventDetails {
        &self.details
    }

    pub fn is_organised_by(&self, user_id: &UserId) -> bool {
        &self.organiser_id == user_id
    }

    /// Replace the editable fields. Identity and ownership are untouched.
    pub fn apply_changes(&mut self, details: EventDetails) {
        self.details = details;
    }
}

impl Entity for Event {
    const KIND: &'static str = "event";
    type Id = EventId;

    fn id(&self) -> EventId {
        self.id
    }
}
