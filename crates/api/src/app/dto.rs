use serde::Serialize;

use homies_core::{DATE_FORMAT_HINT, EventId, FieldError};
use homies_events::{EventForm, EventType, JoinOutcome};

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: EventId,
}

/// Add/Edit form payload: current values, the type catalog and the date hint.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form: EventForm,
    pub types: Vec<EventType>,
    pub date_format: &'static str,
}

impl FormResponse {
    pub fn new(form: EventForm, types: Vec<EventType>) -> Self {
        Self {
            form,
            types,
            date_format: DATE_FORMAT_HINT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub event_id: EventId,
    pub outcome: JoinOutcome,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: String,
    pub user_name: String,
}

/// 400 body for rejected forms; carries enough to re-render the form.
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody<'a> {
    pub error: &'static str,
    pub message: String,
    pub fields: Vec<&'a FieldError>,
    #[serde(flatten)]
    pub form: FormResponse,
}
