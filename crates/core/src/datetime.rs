//! The one textual date/time format shared by input parsing and view output.

use chrono::NaiveDateTime;

/// chrono pattern for every date/time that crosses the presentation boundary.
pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Human-readable form of [`DATE_FORMAT`], used in validation messages.
pub const DATE_FORMAT_HINT: &str = "dd-MM-yyyy HH:mm";

/// Parse `value` strictly against [`DATE_FORMAT`].
///
/// Surrounding whitespace is not trimmed; `" 20-05-2024 18:00"` is rejected.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).ok()
}

/// Render a timestamp with [`DATE_FORMAT`].
pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Message attached to a date field that failed [`parse_date_time`].
pub fn invalid_date_message() -> String {
    format!("Invalid date! Format must be: {DATE_FORMAT_HINT}")
}
