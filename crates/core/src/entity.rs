//! Entity trait: identity that survives edits (events, event types).

use crate::error::DomainError;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Short lowercase label used in not-found messages and log fields.
    const KIND: &'static str;

    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Not-found error for an identifier of this entity kind.
    fn not_found(id: Self::Id) -> DomainError {
        DomainError::not_found(format!("{} {}", Self::KIND, id))
    }
}
