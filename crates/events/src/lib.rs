//! Events domain module (social events, their types and participation).
//!
//! This crate contains the business rules of the event participation core,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod event;
pub mod event_type;
pub mod form;
pub mod participation;
pub mod view;

pub use event::{Event, EventDetails, NewEvent};
pub use event_type::{EventType, TYPE_NAME_MAX_LENGTH, default_catalog};
pub use form::{
    EVENT_DESCRIPTION_MAX_LENGTH, EVENT_DESCRIPTION_MIN_LENGTH, EVENT_NAME_MAX_LENGTH,
    EVENT_NAME_MIN_LENGTH, EventForm,
};
pub use participation::{JoinOutcome, Participation, ParticipationState};
pub use view::{EventDetail, EventDetailRecord, EventListing, EventSummary};
