//! Add/Edit form input and its validation rules.

use serde::{Deserialize, Serialize};

use homies_core::{
    TypeId, ValidationErrors, format_date_time, invalid_date_message, parse_date_time,
    required_message,
};

use crate::event::{Event, EventDetails};

pub const EVENT_NAME_MIN_LENGTH: usize = 3;
pub const EVENT_NAME_MAX_LENGTH: usize = 100;
pub const EVENT_DESCRIPTION_MIN_LENGTH: usize = 10;
pub const EVENT_DESCRIPTION_MAX_LENGTH: usize = 500;

/// Raw, unvalidated event input as submitted by a client.
///
/// Dates are text in [`homies_core::DATE_FORMAT`]; they only become
/// timestamps through [`EventForm::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub type_id: Option<TypeId>,
}

impl EventForm {
    /// Prefill a form from a stored event (Edit view).
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name().to_string(),
            description: event.description().to_string(),
            start: format_date_time(&event.start()),
            end: format_date_time(&event.end()),
            type_id: Some(event.type_id()),
        }
    }

    /// Validate every field and collect all failures.
    ///
    /// `start` and `end` are checked independently, so two bad dates yield two
    /// field errors. No ordering between `start` and `end` is enforced.
    pub fn validate(&self) -> Result<EventDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check_text(
            "name",
            &self.name,
            EVENT_NAME_MIN_LENGTH,
            EVENT_NAME_MAX_LENGTH,
        );
        errors.check_text(
            "description",
            &self.description,
            EVENT_DESCRIPTION_MIN_LENGTH,
            EVENT_DESCRIPTION_MAX_LENGTH,
        );

        let start = date_field(&mut errors, "start", &self.start);
        let end = date_field(&mut errors, "end", &self.end);

        if self.type_id.is_none() {
            errors.push("type_id", required_message("type_id"));
        }

        match (start, end, self.type_id) {
            (Some(start), Some(end), Some(type_id)) if errors.is_empty() => Ok(EventDetails {
                name: self.name.clone(),
                description: self.description.clone(),
                start,
                end,
                type_id,
            }),
            _ => Err(errors),
        }
    }
}

fn date_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<chrono::NaiveDateTime> {
    // A blank date is both missing and unparsable; report both.
    if value.trim().is_empty() {
        errors.push(field, required_message(field));
    }

    let parsed = parse_date_time(value);
    if parsed.is_none() {
        errors.push(field, invalid_date_message());
    }
    parsed
}
