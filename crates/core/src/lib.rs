//! `homies-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, field-scoped validation errors and the
//! single date/time text format shared by every layer.

pub mod datetime;
pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use datetime::{
    DATE_FORMAT, DATE_FORMAT_HINT, format_date_time, invalid_date_message, parse_date_time,
};
pub use entity::Entity;
pub use error::DomainError;
pub use id::{EventId, TypeId, UserId};
pub use validation::{FieldError, ValidationErrors, required_message};
