use thiserror::Error;
use tracing::warn;

use homies_core::{DomainError, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller is not the event's organiser. Carries no event details.
    #[error("forbidden: only the organiser may modify this event")]
    NotOrganiser,
}

impl From<AuthzError> for DomainError {
    fn from(_: AuthzError) -> Self {
        DomainError::Unauthorized
    }
}

/// Ownership check run before any mutation of an event.
///
/// - No IO
/// - No panics
pub fn ensure_organiser(requester: &UserId, organiser: &UserId) -> Result<(), AuthzError> {
    if requester == organiser {
        Ok(())
    } else {
        warn!(requester = %requester, "organiser check failed");
        Err(AuthzError::NotOrganiser)
    }
}
