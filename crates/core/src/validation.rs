//! Field-scoped validation errors.
//!
//! Validation never stops at the first failing field: callers accumulate every
//! problem into a [`ValidationErrors`] list so a form can be re-rendered with
//! all messages at once.

use serde::{Deserialize, Serialize};

/// A single validation failure attached to a named input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Whether any error was recorded for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Messages recorded for `field`, in insertion order.
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Required text with a character-count window (inclusive bounds).
    ///
    /// Whitespace-only input counts as missing. Length is measured in chars,
    /// not bytes.
    pub fn check_text(&mut self, field: &str, value: &str, min: usize, max: usize) {
        if value.trim().is_empty() {
            self.push(field, required_message(field));
            return;
        }

        let len = value.chars().count();
        if len < min || len > max {
            self.push(
                field,
                format!("The field {field} must be between {min} and {max} characters long"),
            );
        }
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, e) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            core::fmt::Display::fmt(e, f)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub fn required_message(field: &str) -> String {
    format!("The field {field} is required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_text_reports_blank_as_required() {
        let mut errors = ValidationErrors::new();
        errors.check_text("Name", "   ", 3, 100);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.messages_for("Name").collect::<Vec<_>>(),
            vec!["The field Name is required"]
        );
    }

    #[test]
    fn check_text_counts_chars_not_bytes() {
        let mut errors = ValidationErrors::new();
        // 3 chars, 6 bytes.
        errors.check_text("Name", "äöü", 3, 3);
        assert!(errors.is_empty());

        errors.check_text("Name", "äöüß", 3, 3);
        assert!(errors.has_field("Name"));
    }

    #[test]
    fn display_joins_all_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("Start", "bad");
        errors.push("End", "worse");

        assert_eq!(errors.to_string(), "Start: bad; End: worse");
    }

    #[test]
    fn into_result_passes_value_through_when_clean() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.into_result(7), Ok(7));
    }
}
